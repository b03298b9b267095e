use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use rayon::prelude::*;

use crate::{
    assets::{
        decode::{list_image_files, load_frame},
        resample::resize_area,
    },
    blocks::closest_index,
    foundation::{
        core::{Bgr, PixelBuffer},
        error::{FxError, FxResult},
        math::average_color,
    },
};

/// Solid colors used when the tile directory yields nothing usable, as `(name, [b, g, r])`.
const FALLBACK_PALETTE: [(&str, [u8; 3]); 9] = [
    ("red", [0, 0, 255]),
    ("green", [0, 255, 0]),
    ("blue", [255, 0, 0]),
    ("yellow", [0, 255, 255]),
    ("magenta", [255, 0, 255]),
    ("cyan", [255, 255, 0]),
    ("gray", [128, 128, 128]),
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
];

/// One mosaic tile: a `tile_size` square image indexed by its average color.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub name: String,
    pub average_color: Bgr,
    pub image: PixelBuffer,
}

impl Tile {
    /// Downsample `image` to `tile_size` and index it.
    pub fn from_image(
        name: impl Into<String>,
        image: &PixelBuffer,
        tile_size: u32,
    ) -> FxResult<Self> {
        let image = resize_area(image, tile_size, tile_size)?;
        Ok(Self {
            name: name.into(),
            average_color: average_color(&image, image.bounds()),
            image,
        })
    }

    fn solid(name: &str, bgr: [u8; 3], tile_size: u32) -> FxResult<Self> {
        Ok(Self {
            name: format!("fallback-{name}"),
            average_color: Bgr::from_bytes(bgr),
            image: PixelBuffer::filled(tile_size, tile_size, bgr)?,
        })
    }
}

#[derive(Debug)]
struct Loaded {
    tiles: Vec<Tile>,
    fallback: bool,
}

enum Source {
    Directory(PathBuf),
    Memory(Vec<(String, PixelBuffer)>),
}

/// Average-color index over a set of tiles.
///
/// Tiles are loaded at most once, on first use, even with concurrent callers. After that
/// the library is read-only and can be shared freely.
pub struct TileLibrary {
    source: Source,
    tile_size: u32,
    loaded: OnceLock<FxResult<Loaded>>,
}

impl TileLibrary {
    /// Library backed by image files in `directory`. Nothing is read until first use.
    pub fn new(directory: impl Into<PathBuf>, tile_size: u32) -> FxResult<Self> {
        Self::with_source(Source::Directory(directory.into()), tile_size)
    }

    /// Library built from in-memory images, in the given order.
    pub fn from_tiles(images: Vec<(String, PixelBuffer)>, tile_size: u32) -> FxResult<Self> {
        Self::with_source(Source::Memory(images), tile_size)
    }

    fn with_source(source: Source, tile_size: u32) -> FxResult<Self> {
        if tile_size == 0 {
            return Err(FxError::validation("tile size must be > 0"));
        }
        Ok(Self {
            source,
            tile_size,
            loaded: OnceLock::new(),
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Load tiles if that has not happened yet and return them in load order.
    pub fn ensure_loaded(&self) -> FxResult<&[Tile]> {
        self.loaded().map(|l| l.tiles.as_slice())
    }

    pub fn tiles(&self) -> FxResult<&[Tile]> {
        self.ensure_loaded()
    }

    pub fn len(&self) -> FxResult<usize> {
        Ok(self.ensure_loaded()?.len())
    }

    pub fn is_empty(&self) -> FxResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Whether the synthetic palette stands in for real tiles.
    pub fn is_fallback(&self) -> FxResult<bool> {
        Ok(self.loaded()?.fallback)
    }

    /// The tile whose average color is nearest to `color`; ties go to the earliest tile.
    pub fn find_closest(&self, color: Bgr) -> FxResult<&Tile> {
        let tiles = self.ensure_loaded()?;
        closest_index(color, tiles.iter().map(|t| t.average_color))
            .map(|i| &tiles[i])
            .ok_or_else(|| FxError::resource("tile library is empty"))
    }

    fn loaded(&self) -> FxResult<&Loaded> {
        match self.loaded.get_or_init(|| self.load()) {
            Ok(l) => Ok(l),
            Err(e) => Err(FxError::resource(format!("tile library failed to load: {e}"))),
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(tile_size = self.tile_size))]
    fn load(&self) -> FxResult<Loaded> {
        let tiles = match &self.source {
            Source::Directory(dir) => load_directory(dir, self.tile_size),
            Source::Memory(images) => images
                .iter()
                .filter_map(
                    |(name, img)| match Tile::from_image(name.clone(), img, self.tile_size) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            tracing::warn!(name = %name, error = %e, "skipping tile");
                            None
                        }
                    },
                )
                .collect(),
        };

        if !tiles.is_empty() {
            tracing::info!(count = tiles.len(), "tile library loaded");
            return Ok(Loaded {
                tiles,
                fallback: false,
            });
        }

        tracing::warn!("no usable tiles found, using fallback palette");
        let tiles = FALLBACK_PALETTE
            .iter()
            .map(|(name, bgr)| Tile::solid(name, *bgr, self.tile_size))
            .collect::<FxResult<Vec<_>>>()?;
        Ok(Loaded {
            tiles,
            fallback: true,
        })
    }
}

impl std::fmt::Debug for TileLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            Source::Directory(d) => d.display().to_string(),
            Source::Memory(v) => format!("<{} in-memory images>", v.len()),
        };
        f.debug_struct("TileLibrary")
            .field("source", &source)
            .field("tile_size", &self.tile_size)
            .field("loaded", &self.loaded.get().is_some())
            .finish()
    }
}

fn load_directory(dir: &Path, tile_size: u32) -> Vec<Tile> {
    let paths = match list_image_files(dir) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "tile directory unreadable");
            return Vec::new();
        }
    };

    paths
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            load_frame(path)
                .and_then(|img| Tile::from_image(name, &img, tile_size))
                .map_err(|e| (path, e))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .filter_map(|r| match r {
            Ok(tile) => Some(tile),
            Err((path, e)) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable tile");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/mosaic/library.rs"]
mod tests;
