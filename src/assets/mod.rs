//! Image I/O and resampling.

/// Decoding, PNG output and directory scanning.
pub mod decode;
/// Area-averaging resize.
pub mod resample;
