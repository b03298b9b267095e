//! Frame sinks.
//!
//! Sinks consume produced frames in index order and are fed by the drivers in
//! [`crate::pipeline`].

/// Generic frame sink trait and built-in sinks.
pub mod sink;
