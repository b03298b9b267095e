use crate::foundation::core::{CHANNELS, PixelBuffer};
use crate::foundation::error::{FxError, FxResult};

/// Resize with area averaging: every output pixel is the coverage-weighted mean of the source
/// pixels its footprint overlaps. Returns a clone when the size is unchanged.
pub fn resize_area(src: &PixelBuffer, width: u32, height: u32) -> FxResult<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(FxError::validation(format!(
            "resize target must be > 0, got {width}x{height}"
        )));
    }
    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }

    let (sw, sh) = src.dimensions();
    let xw = axis_weights(sw, width);
    let yw = axis_weights(sh, height);

    // Horizontal pass: out_w columns for every source row.
    let tmp_stride = width as usize * CHANNELS;
    let mut tmp = vec![0f64; tmp_stride * sh as usize];
    let src_stride = src.stride();
    let data = src.data();
    for row in 0..sh as usize {
        let src_row = &data[row * src_stride..(row + 1) * src_stride];
        let tmp_row = &mut tmp[row * tmp_stride..(row + 1) * tmp_stride];
        for (ox, taps) in xw.iter().enumerate() {
            let mut acc = [0f64; 3];
            for &(sx, w) in taps {
                let i = sx * CHANNELS;
                for c in 0..CHANNELS {
                    acc[c] += w * f64::from(src_row[i + c]);
                }
            }
            tmp_row[ox * CHANNELS..ox * CHANNELS + CHANNELS].copy_from_slice(&acc);
        }
    }

    // Vertical pass.
    let mut out = vec![0u8; tmp_stride * height as usize];
    for (oy, taps) in yw.iter().enumerate() {
        let out_row = &mut out[oy * tmp_stride..(oy + 1) * tmp_stride];
        for (i, v) in out_row.iter_mut().enumerate() {
            let mut acc = 0f64;
            for &(sy, w) in taps {
                acc += w * tmp[sy * tmp_stride + i];
            }
            *v = acc.round_ties_even().clamp(0.0, 255.0) as u8;
        }
    }

    PixelBuffer::from_raw(width, height, out)
}

/// For each destination index, the `(source index, weight)` taps covering it. Weights sum to 1.
fn axis_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|i| {
            let start = f64::from(i) * scale;
            let end = (start + scale).min(f64::from(src_len));
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).clamp(first + 1, src_len as usize);
            (first..last)
                .filter_map(|s| {
                    let lo = start.max(s as f64);
                    let hi = end.min(s as f64 + 1.0);
                    let overlap = hi - lo;
                    (overlap > 0.0).then_some((s, overlap / scale))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resample.rs"]
mod tests;
