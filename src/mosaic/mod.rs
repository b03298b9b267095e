//! Photo mosaics: every block of a frame is replaced by the tile closest in mean color.

/// Frame-to-mosaic composition.
pub mod composer;
/// Tile loading and nearest-color lookup.
pub mod library;
