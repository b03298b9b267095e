//! framefx is a set of per-frame image engines.
//!
//! - [`BackgroundModel`]: ViBe background subtraction producing segmentation maps
//! - [`MosaicComposer`]: photo mosaics built from a [`TileLibrary`]
//! - [`ParticleMorphEngine`]: block-particle transitions from one image to another
//!
//! Frames are [`PixelBuffer`]s in B, G, R order. The drivers in [`pipeline`] stream whole
//! sequences into a [`FrameSink`].
#![forbid(unsafe_code)]

/// Image decoding, PNG output and resizing.
pub mod assets;
/// ViBe background subtraction.
pub mod background;
/// Block partitioning and nearest-color matching.
pub mod blocks;
/// Engine configuration and settings files.
pub mod config;
/// Frame sinks.
pub mod encode;
/// Core types and errors.
pub mod foundation;
/// Particle morph engine.
pub mod morph;
/// Photo mosaic engine.
pub mod mosaic;
/// Sequence drivers.
pub mod pipeline;
/// Worker pool.
pub mod render;

pub use crate::foundation::core::{Bgr, CHANNELS, PixelBuffer, Rect};
pub use crate::foundation::error::{FxError, FxResult};

pub use crate::background::segmap::SegmapMode;
pub use crate::background::vibe::{BackgroundModel, ClassifyStats};
pub use crate::blocks::{Block, closest_index, greedy_pairs, partition_blocks};
pub use crate::config::{MorphConfig, MosaicConfig, Settings, VibeConfig};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::morph::engine::{Particle, ParticleMorphEngine};
pub use crate::mosaic::composer::MosaicComposer;
pub use crate::mosaic::library::{Tile, TileLibrary};
pub use crate::pipeline::{morph_frames, mosaic_frames, segment_frames};
pub use crate::render::pool::WorkerPool;
