use std::borrow::Cow;
use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    assets::resample::resize_area,
    config::MosaicConfig,
    foundation::{
        core::{CHANNELS, PixelBuffer, Rect},
        error::FxResult,
        math::average_color,
    },
    mosaic::library::TileLibrary,
    render::pool::WorkerPool,
};

/// Replaces every `tile_size` block of a frame with the tile closest to the block's mean color.
#[derive(Debug)]
pub struct MosaicComposer {
    config: MosaicConfig,
    library: Arc<TileLibrary>,
    pool: WorkerPool,
}

impl MosaicComposer {
    /// Composer over a library rooted at `config.tile_directory`. Tiles load on first use.
    pub fn new(config: MosaicConfig) -> FxResult<Self> {
        config.validate()?;
        let library = TileLibrary::new(config.tile_directory.clone(), config.tile_size)?;
        Ok(Self {
            config,
            library: Arc::new(library),
            pool: WorkerPool::default(),
        })
    }

    /// Share an existing library. Its tile size wins over `config.tile_size`.
    pub fn with_library(mut config: MosaicConfig, library: Arc<TileLibrary>) -> FxResult<Self> {
        config.tile_size = library.tile_size();
        config.validate()?;
        Ok(Self {
            config,
            library,
            pool: WorkerPool::default(),
        })
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub fn library(&self) -> &Arc<TileLibrary> {
        &self.library
    }

    /// Build the mosaic for `frame`. The output has the same dimensions as the input.
    #[tracing::instrument(level = "debug", skip_all, fields(width = frame.width(), height = frame.height()))]
    pub fn compose(&self, frame: &PixelBuffer) -> FxResult<PixelBuffer> {
        self.library.ensure_loaded()?;

        let size = self.config.tile_size;
        let (width, height) = frame.dimensions();
        let stride = frame.stride();
        let mut out = PixelBuffer::new(width, height)?;

        let band_len = size as usize * stride;
        let library = &self.library;
        self.pool.install(|| {
            out.data_mut()
                .par_chunks_mut(band_len)
                .enumerate()
                .try_for_each(|(band, dst)| -> FxResult<()> {
                    let y = band as u32 * size;
                    let h = size.min(height - y);
                    let mut x = 0;
                    while x < width {
                        let rect = Rect::new(x, y, size.min(width - x), h);
                        let tile = library.find_closest(average_color(frame, rect))?;
                        let patch = if (rect.width, rect.height) == tile.image.dimensions() {
                            Cow::Borrowed(&tile.image)
                        } else {
                            Cow::Owned(resize_area(&tile.image, rect.width, rect.height)?)
                        };
                        blit_into_band(dst, stride, x, &patch);
                        x += size;
                    }
                    Ok(())
                })
        })?;

        tracing::debug!(tile_size = size, "composed mosaic");
        Ok(out)
    }
}

/// Copy `patch` into a band of full-width rows, starting at column `x`.
fn blit_into_band(band: &mut [u8], stride: usize, x: u32, patch: &PixelBuffer) {
    let offset = x as usize * CHANNELS;
    let row_len = patch.stride();
    for (dst_row, src_row) in band
        .chunks_mut(stride)
        .zip(patch.data().chunks_exact(row_len))
    {
        dst_row[offset..offset + row_len].copy_from_slice(src_row);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mosaic/composer.rs"]
mod tests;
