use std::time::Duration;

use rayon::prelude::*;

use crate::{
    blocks::{greedy_pairs, partition_blocks},
    config::MorphConfig,
    foundation::{
        core::{Bgr, CHANNELS, PixelBuffer, Rect},
        error::{FxError, FxResult},
        math::lerp,
    },
    render::pool::WorkerPool,
};

/// Rows rendered per parallel task.
const BAND_ROWS: usize = 16;

/// A source block travelling to the target block it was paired with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub start_rect: Rect,
    pub end_rect: Rect,
    /// Source block color; it does not change along the way.
    pub color: Bgr,
}

impl Particle {
    /// Rectangle at `progress` in `[0, 1]`, kept inside a `width × height` canvas.
    pub fn bounds_at(&self, progress: f64, width: u32, height: u32) -> Rect {
        let (s, e) = (self.start_rect, self.end_rect);
        let at = |a: u32, b: u32| lerp(f64::from(a), f64::from(b), progress).round_ties_even();

        let w = (at(s.width, e.width).max(1.0) as u32).min(width);
        let h = (at(s.height, e.height).max(1.0) as u32).min(height);
        let x = (at(s.x, e.x).max(0.0) as u32).min(width - w);
        let y = (at(s.y, e.y).max(0.0) as u32).min(height - h);
        Rect::new(x, y, w, h)
    }
}

#[derive(Debug)]
struct MorphState {
    width: u32,
    height: u32,
    particles: Vec<Particle>,
}

/// Animates the blocks of a source image into the layout of a target image.
///
/// Each source block is paired with a target block of similar color and slides towards it over
/// `total_steps` frames, keeping its own color. Frames are rendered on demand and the engine
/// never sleeps; [`frame_delay`](Self::frame_delay) is a hint for whoever presents them.
#[derive(Debug)]
pub struct ParticleMorphEngine {
    config: MorphConfig,
    pool: WorkerPool,
    state: Option<MorphState>,
}

impl ParticleMorphEngine {
    pub fn new(config: MorphConfig) -> FxResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pool: WorkerPool::default(),
            state: None,
        })
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &MorphConfig {
        &self.config
    }

    pub fn total_steps(&self) -> u32 {
        self.config.total_steps
    }

    pub fn frame_delay_ms(&self) -> u32 {
        self.config.frame_delay_ms
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.config.frame_delay_ms))
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.state.as_ref().map(|s| (s.width, s.height))
    }

    /// Particles in creation order; empty before [`initialize`](Self::initialize).
    pub fn particles(&self) -> &[Particle] {
        self.state
            .as_ref()
            .map(|s| s.particles.as_slice())
            .unwrap_or_default()
    }

    /// Pair the blocks of `source` with those of `target`. Both must have the same size.
    #[tracing::instrument(level = "debug", skip_all, fields(width = source.width(), height = source.height()))]
    pub fn initialize(&mut self, source: &PixelBuffer, target: &PixelBuffer) -> FxResult<()> {
        if source.dimensions() != target.dimensions() {
            return Err(FxError::dimensions(source.dimensions(), target.dimensions()));
        }
        let size = self.config.particle_size;
        let (src_blocks, dst_blocks) = self.pool.install(|| {
            rayon::join(
                || partition_blocks(source, size),
                || partition_blocks(target, size),
            )
        });

        let particles: Vec<Particle> = greedy_pairs(&src_blocks, &dst_blocks)
            .into_iter()
            .map(|(s, t)| Particle {
                start_rect: s.rect,
                end_rect: t.rect,
                color: s.color,
            })
            .collect();

        tracing::debug!(particles = particles.len(), "paired morph particles");
        self.state = Some(MorphState {
            width: source.width(),
            height: source.height(),
            particles,
        });
        Ok(())
    }

    /// Interpolation progress for `frame_index`, clamped to `[0, 1]`.
    pub fn progress(&self, frame_index: u64) -> f64 {
        let last = u64::from(self.config.total_steps.saturating_sub(1)).max(1);
        (frame_index as f64 / last as f64).clamp(0.0, 1.0)
    }

    /// Particle rectangles at `frame_index`, in creation order.
    pub fn frame_geometry(&self, frame_index: u64) -> FxResult<Vec<Rect>> {
        let state = self.require_state()?;
        let progress = self.progress(frame_index);
        Ok(state
            .particles
            .iter()
            .map(|p| p.bounds_at(progress, state.width, state.height))
            .collect())
    }

    /// Rasterize `frame_index` onto a black canvas. Later particles overdraw earlier ones.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn render_frame(&self, frame_index: u64) -> FxResult<PixelBuffer> {
        let state = self.require_state()?;
        let rects = self.frame_geometry(frame_index)?;
        let fills: Vec<(Rect, [u8; 3])> = rects
            .into_iter()
            .zip(&state.particles)
            .map(|(r, p)| (r, p.color.to_bytes()))
            .collect();

        let mut canvas = PixelBuffer::new(state.width, state.height)?;
        let stride = canvas.stride();
        self.pool.install(|| {
            canvas
                .data_mut()
                .par_chunks_mut(BAND_ROWS * stride)
                .enumerate()
                .for_each(|(band, rows)| {
                    let top = (band * BAND_ROWS) as u32;
                    let bottom = top + (rows.len() / stride) as u32;
                    for (rect, bgr) in &fills {
                        fill_band(rows, stride, top, bottom, *rect, *bgr);
                    }
                });
        });
        Ok(canvas)
    }

    /// Every frame of the transition, `0..total_steps`, rendered lazily in order.
    pub fn frames(&self) -> impl Iterator<Item = FxResult<PixelBuffer>> + '_ {
        (0..u64::from(self.config.total_steps)).map(move |i| self.render_frame(i))
    }

    fn require_state(&self) -> FxResult<&MorphState> {
        self.state.as_ref().ok_or_else(|| {
            FxError::precondition("render called before initialize on morph engine")
        })
    }
}

/// Fill the part of `rect` that falls inside rows `top..bottom`.
fn fill_band(rows: &mut [u8], stride: usize, top: u32, bottom: u32, rect: Rect, bgr: [u8; 3]) {
    let y0 = rect.y.max(top);
    let y1 = rect.bottom().min(bottom);
    let x0 = rect.x as usize * CHANNELS;
    let x1 = rect.right() as usize * CHANNELS;
    for y in y0..y1 {
        let row = &mut rows[(y - top) as usize * stride..][..stride];
        for px in row[x0..x1].chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&bgr);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/morph/engine.rs"]
mod tests;
