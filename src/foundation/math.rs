use crate::foundation::core::{Bgr, CHANNELS, PixelBuffer, Rect};

/// Luma weights applied to B, G, R.
pub(crate) const LUMA_WEIGHTS: [f64; 3] = [0.11, 0.59, 0.30];

pub(crate) fn luma(px: [u8; 3]) -> f64 {
    LUMA_WEIGHTS[0] * f64::from(px[0])
        + LUMA_WEIGHTS[1] * f64::from(px[1])
        + LUMA_WEIGHTS[2] * f64::from(px[2])
}

pub(crate) fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

/// Mean color over `rect`. The divisor is floored at one pixel.
pub fn average_color(image: &PixelBuffer, rect: Rect) -> Bgr {
    let stride = image.stride();
    let data = image.data();
    let mut sum = [0u64; 3];
    for row in rect.y..rect.bottom() {
        let start = row as usize * stride + rect.x as usize * CHANNELS;
        let end = start + rect.width as usize * CHANNELS;
        for px in data[start..end].chunks_exact(CHANNELS) {
            sum[0] += u64::from(px[0]);
            sum[1] += u64::from(px[1]);
            sum[2] += u64::from(px[2]);
        }
    }
    let total = rect.area().max(1) as f64;
    Bgr::new(
        sum[0] as f64 / total,
        sum[1] as f64 / total,
        sum[2] as f64 / total,
    )
}

/// Raster-order grid of `block × block` cells covering `width × height`.
/// Cells on the right and bottom edges are clamped to what remains.
pub(crate) fn block_grid(width: u32, height: u32, block: u32) -> impl Iterator<Item = Rect> {
    let block = block.max(1);
    (0..height).step_by(block as usize).flat_map(move |y| {
        let h = block.min(height - y);
        (0..width)
            .step_by(block as usize)
            .map(move |x| Rect::new(x, y, block.min(width - x), h))
    })
}
