//! ViBe background subtraction.
//!
//! [`vibe::BackgroundModel`] keeps a bank of color samples per pixel and turns each frame into
//! a segmentation map. An optional shaky-camera detector rebuilds the model when the whole view
//! changes at once.

pub(crate) mod bank;
pub(crate) mod motion;
/// Segmentation map rendering modes.
pub mod segmap;
/// The background model.
pub mod vibe;
