use rayon::prelude::*;

use crate::foundation::{
    core::{CHANNELS, PixelBuffer},
    math::luma,
};

/// Shaky-camera detector: two alternating per-pixel luma snapshots.
///
/// Even frames write slot 0 and compare against slot 1, odd frames do the opposite. Frame 0
/// never compares, so it always reports zero unchanged pixels.
#[derive(Clone, Debug)]
pub(crate) struct MotionDetector {
    width: u32,
    slots: [Vec<f64>; 2],
}

impl MotionDetector {
    pub(crate) fn seeded(frame: &PixelBuffer) -> Self {
        let mut det = Self {
            width: frame.width(),
            slots: [Vec::new(), Vec::new()],
        };
        det.reseed(frame);
        det
    }

    /// Both slots take the luma of `frame`.
    pub(crate) fn reseed(&mut self, frame: &PixelBuffer) {
        let snapshot: Vec<f64> = frame
            .data()
            .par_chunks_exact(CHANNELS)
            .map(|px| luma([px[0], px[1], px[2]]))
            .collect();
        self.slots = [snapshot.clone(), snapshot];
    }

    /// Snapshot `frame` into the slot owned by `frame_index` and count pixels whose luma is
    /// within `tolerance` of the other slot.
    pub(crate) fn observe(&mut self, frame: &PixelBuffer, frame_index: u64, tolerance: f64) -> u64 {
        let write_slot = if frame_index % 2 == 0 {
            if frame_index == 0 {
                return 0;
            }
            0
        } else {
            1
        };

        let [s0, s1] = &mut self.slots;
        let (current, previous) = if write_slot == 0 {
            (s0, &*s1)
        } else {
            (s1, &*s0)
        };

        let row = self.width as usize;
        current
            .par_chunks_mut(row)
            .zip(previous.par_chunks(row))
            .zip(frame.data().par_chunks(frame.stride()))
            .map(|((cur_row, prev_row), frame_row)| {
                let mut unchanged = 0u64;
                for ((cur, prev), px) in cur_row
                    .iter_mut()
                    .zip(prev_row)
                    .zip(frame_row.chunks_exact(CHANNELS))
                {
                    *cur = luma([px[0], px[1], px[2]]);
                    if (*cur - *prev).abs() <= tolerance {
                        unchanged += 1;
                    }
                }
                unchanged
            })
            .sum()
    }
}
