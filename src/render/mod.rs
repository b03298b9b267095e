//! Execution resources shared by the engines.

/// Optional dedicated rayon pool.
pub mod pool;
