use rayon::prelude::*;

use crate::foundation::core::{CHANNELS, PixelBuffer};

/// Flat per-pixel sample store indexed `(y, x, slot, channel)`.
///
/// One row of pixels is one contiguous chunk of `width * samples * 3` bytes, so rows can be
/// handed to workers independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SampleBank {
    width: u32,
    height: u32,
    samples: usize,
    data: Vec<u8>,
}

impl SampleBank {
    /// Bank where every slot of every pixel holds that pixel's color in `frame`.
    pub(crate) fn seeded(frame: &PixelBuffer, samples: usize) -> Self {
        let (width, height) = frame.dimensions();
        let mut bank = Self {
            width,
            height,
            samples,
            data: vec![0u8; width as usize * height as usize * samples * CHANNELS],
        };
        bank.reseed(frame);
        bank
    }

    /// Overwrite every slot with `frame`. Dimensions must already match.
    pub(crate) fn reseed(&mut self, frame: &PixelBuffer) {
        debug_assert_eq!(frame.dimensions(), self.dimensions());
        let row_len = self.row_len();
        let per_px = self.pixel_len();
        self.data
            .par_chunks_mut(row_len)
            .zip(frame.data().par_chunks(frame.stride()))
            .for_each(|(bank_row, frame_row)| {
                for (slots, px) in bank_row
                    .chunks_exact_mut(per_px)
                    .zip(frame_row.chunks_exact(CHANNELS))
                {
                    for slot in slots.chunks_exact_mut(CHANNELS) {
                        slot.copy_from_slice(px);
                    }
                }
            });
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn samples(&self) -> usize {
        self.samples
    }

    /// Bytes of sample data per pixel.
    pub(crate) fn pixel_len(&self) -> usize {
        self.samples * CHANNELS
    }

    /// Bytes of sample data per image row.
    pub(crate) fn row_len(&self) -> usize {
        self.width as usize * self.pixel_len()
    }

    pub(crate) fn rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, u8> {
        let row_len = self.row_len();
        self.data.par_chunks_mut(row_len)
    }

    pub(crate) fn sample(&self, x: u32, y: u32, slot: usize) -> [u8; 3] {
        let i = self.offset(x, y, slot);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub(crate) fn set_sample(&mut self, x: u32, y: u32, slot: usize, bgr: [u8; 3]) {
        let i = self.offset(x, y, slot);
        self.data[i..i + CHANNELS].copy_from_slice(&bgr);
    }

    fn offset(&self, x: u32, y: u32, slot: usize) -> usize {
        debug_assert!(x < self.width && y < self.height && slot < self.samples);
        y as usize * self.row_len() + x as usize * self.pixel_len() + slot * CHANNELS
    }
}

/// Count samples within `radius` of `px` on every channel, stopping once `required` is reached.
#[inline]
pub(crate) fn count_matches(slots: &[u8], px: [u8; 3], radius: u16, required: u32) -> u32 {
    let mut count = 0u32;
    for s in slots.chunks_exact(CHANNELS) {
        if count >= required {
            break;
        }
        let close = (0..CHANNELS).all(|c| u16::from(s[c].abs_diff(px[c])) < radius);
        if close {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
#[path = "../../tests/unit/background/bank.rs"]
mod tests;
