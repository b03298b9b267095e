use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::{
    background::{
        bank::{SampleBank, count_matches},
        motion::MotionDetector,
    },
    config::VibeConfig,
    foundation::{
        core::{CHANNELS, PixelBuffer},
        error::{FxError, FxResult},
    },
    render::pool::WorkerPool,
};

/// 8-connected neighbour offsets used for spatial diffusion.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Counters describing the most recent [`BackgroundModel::classify`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub frame_index: u64,
    pub foreground_pixels: u64,
    pub background_pixels: u64,
    /// Diffusion writes applied to neighbouring pixels after the parallel pass.
    pub diffusion_writes: u64,
    /// Unchanged-luma pixel count, when shaky-camera detection is enabled.
    pub motion_matches: Option<u64>,
    /// Whether the model was rebuilt from this frame because the camera moved.
    pub reinitialized: bool,
}

/// A pending write of `bgr` into `slot` of pixel `(x, y)`.
#[derive(Clone, Copy, Debug)]
struct Diffusion {
    x: u32,
    y: u32,
    slot: usize,
    bgr: [u8; 3],
}

struct ModelState {
    bank: SampleBank,
    motion: Option<MotionDetector>,
}

/// Per-row parameters copied out of the model so rows can run on any worker.
#[derive(Clone, Copy)]
struct RowParams {
    width: u32,
    height: u32,
    radius: u16,
    required: u32,
    phi: u32,
    samples: usize,
    frame_seed: u64,
    mode: crate::background::segmap::SegmapMode,
}

/// ViBe background subtraction model.
///
/// Every pixel keeps `N` previously observed colors. A pixel is background when at least
/// `#min` of them lie within `R` of its current color on every channel. Background pixels
/// randomly refresh their own samples and diffuse into a neighbour's, so the model follows
/// slow scene changes while moving objects stay foreground.
///
/// The random generator is owned by the model and injected at construction; seeding it makes
/// [`classify`](Self::classify) fully reproducible, independent of worker count.
pub struct BackgroundModel {
    config: VibeConfig,
    rng: StdRng,
    pool: WorkerPool,
    state: Option<ModelState>,
    last_stats: Option<ClassifyStats>,
}

impl BackgroundModel {
    /// Build a model. Uses `config.seed` when set, OS entropy otherwise.
    pub fn new(config: VibeConfig) -> FxResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_seed(config: VibeConfig, seed: u64) -> FxResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: VibeConfig, rng: StdRng) -> FxResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng,
            pool: WorkerPool::default(),
            state: None,
            last_stats: None,
        })
    }

    /// Run parallel sections on `pool` instead of the global rayon pool.
    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &VibeConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Resolution of the current sample bank, if any.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.state.as_ref().map(|s| s.bank.dimensions())
    }

    pub fn last_stats(&self) -> Option<ClassifyStats> {
        self.last_stats
    }

    /// Drop the sample bank; the next call must be [`initialize`](Self::initialize).
    pub fn reset(&mut self) {
        self.state = None;
        self.last_stats = None;
    }

    /// Seed every sample slot with `frame`. Reallocates when the resolution changes.
    #[tracing::instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn initialize(&mut self, frame: &PixelBuffer) -> FxResult<()> {
        let samples = self.config.sample_count as usize;
        let shaky = self.config.shaky_camera;
        let pool = &self.pool;
        match self.state.as_mut() {
            Some(state) if state.bank.dimensions() == frame.dimensions() => pool.install(|| {
                state.bank.reseed(frame);
                match &mut state.motion {
                    Some(m) => m.reseed(frame),
                    None if shaky => state.motion = Some(MotionDetector::seeded(frame)),
                    None => {}
                }
            }),
            _ => {
                if let Some(old) = self.dimensions() {
                    tracing::debug!(?old, new = ?frame.dimensions(), "reallocating sample bank");
                }
                let state = pool.install(|| ModelState {
                    bank: SampleBank::seeded(frame, samples),
                    motion: shaky.then(|| MotionDetector::seeded(frame)),
                });
                self.state = Some(state);
            }
        }
        Ok(())
    }

    /// Classify every pixel of `frame` and update the model.
    ///
    /// Returns the segmentation map rendered according to the configured
    /// [`SegmapMode`](crate::SegmapMode).
    #[tracing::instrument(level = "debug", skip(self, frame))]
    pub fn classify(&mut self, frame: &PixelBuffer, frame_index: u64) -> FxResult<PixelBuffer> {
        let Some(state) = self.state.as_mut() else {
            return Err(FxError::precondition(
                "classify called before initialize on background model",
            ));
        };
        if state.bank.dimensions() != frame.dimensions() {
            return Err(FxError::dimensions(
                state.bank.dimensions(),
                frame.dimensions(),
            ));
        }

        let params = RowParams {
            width: frame.width(),
            height: frame.height(),
            radius: self.config.color_distance_threshold,
            required: self.config.required_matches,
            phi: self.config.decay_rate,
            samples: state.bank.samples(),
            frame_seed: self.rng.random(),
            mode: self.config.segmap_mode,
        };
        let tolerance = self.config.luma_tolerance;

        let mut segmap = PixelBuffer::new(params.width, params.height)?;
        let stride = frame.stride();

        let (motion_matches, rows) = self.pool.install(|| {
            let motion_matches = state
                .motion
                .as_mut()
                .map(|m| m.observe(frame, frame_index, tolerance));

            let rows: Vec<RowOutcome> = state
                .bank
                .rows_mut()
                .zip(segmap.data_mut().par_chunks_mut(stride))
                .zip(frame.data().par_chunks(stride))
                .enumerate()
                .map(|(y, ((bank_row, out_row), frame_row))| {
                    classify_row(&params, y as u32, frame_row, bank_row, out_row)
                })
                .collect();
            (motion_matches, rows)
        });

        let mut stats = ClassifyStats {
            frame_index,
            motion_matches,
            ..ClassifyStats::default()
        };
        for row in rows {
            stats.foreground_pixels += row.foreground;
            for d in row.diffusions {
                state.bank.set_sample(d.x, d.y, d.slot, d.bgr);
                stats.diffusion_writes += 1;
            }
        }
        let total = u64::from(params.width) * u64::from(params.height);
        stats.background_pixels = total - stats.foreground_pixels;

        if let Some(matches) = motion_matches {
            let unchanged = matches as f64 / total.max(1) as f64;
            if unchanged < self.config.frame_difference_threshold {
                tracing::info!(
                    frame_index,
                    unchanged,
                    "camera motion detected, reinitializing background model"
                );
                self.initialize(frame)?;
                stats.reinitialized = true;
            }
        }

        tracing::debug!(
            frame_index,
            foreground = stats.foreground_pixels,
            diffusion = stats.diffusion_writes,
            "classified frame"
        );
        self.last_stats = Some(stats);
        Ok(segmap)
    }
}

impl std::fmt::Debug for BackgroundModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundModel")
            .field("config", &self.config)
            .field("dimensions", &self.dimensions())
            .field("last_stats", &self.last_stats)
            .finish()
    }
}

struct RowOutcome {
    foreground: u64,
    diffusions: Vec<Diffusion>,
}

fn row_rng(frame_seed: u64, y: u32) -> StdRng {
    StdRng::seed_from_u64(frame_seed ^ u64::from(y).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn classify_row(
    p: &RowParams,
    y: u32,
    frame_row: &[u8],
    bank_row: &mut [u8],
    out_row: &mut [u8],
) -> RowOutcome {
    let mut rng = row_rng(p.frame_seed, y);
    let per_px = p.samples * CHANNELS;
    let mut outcome = RowOutcome {
        foreground: 0,
        diffusions: Vec::new(),
    };

    for (x, ((px, slots), out)) in frame_row
        .chunks_exact(CHANNELS)
        .zip(bank_row.chunks_exact_mut(per_px))
        .zip(out_row.chunks_exact_mut(CHANNELS))
        .enumerate()
    {
        let x = x as u32;
        let px = [px[0], px[1], px[2]];
        let matches = count_matches(slots, px, p.radius, p.required);

        if matches < p.required {
            out.copy_from_slice(&p.mode.foreground_px(px, x, y));
            outcome.foreground += 1;
            continue;
        }

        out.copy_from_slice(&p.mode.background_px(px));

        if rng.random_range(0..p.phi) == 0 {
            let slot = rng.random_range(0..p.samples);
            slots[slot * CHANNELS..slot * CHANNELS + CHANNELS].copy_from_slice(&px);
        }

        if rng.random_range(0..p.phi) == 0 {
            let slot = rng.random_range(0..p.samples);
            let (dx, dy) = NEIGHBOURS[rng.random_range(0..NEIGHBOURS.len())];
            outcome.diffusions.push(Diffusion {
                x: step(x, dx, p.width),
                y: step(y, dy, p.height),
                slot,
                bgr: px,
            });
        }
    }
    outcome
}

/// Move `v` by `d`, staying put when that would leave `0..len`.
fn step(v: u32, d: i32, len: u32) -> u32 {
    match v.checked_add_signed(d) {
        Some(n) if n < len => n,
        _ => v,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/background/vibe.rs"]
mod tests;
