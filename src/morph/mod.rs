//! Particle morph transitions between two images.

/// Block pairing and frame rendering.
pub mod engine;
