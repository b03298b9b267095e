//! Core frame types, shared math and the error taxonomy.

/// Frame buffer, rectangles and colors.
pub mod core;
/// Error taxonomy and result alias.
pub mod error;
/// Luma, averaging and block grids.
pub mod math;
