/// Convenience result type used across framefx.
pub type FxResult<T> = Result<T, FxError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum FxError {
    /// Invalid configuration, rejected before any frame is processed.
    #[error("validation error: {0}")]
    Validation(String),

    /// An engine was called out of order (e.g. classify before initialize).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Frame dimensions do not match the dimensions an engine was prepared for.
    #[error(
        "dimension mismatch: expected {}x{}, got {}x{}",
        .expected.0, .expected.1, .actual.0, .actual.1
    )]
    DimensionMismatch {
        /// `(width, height)` the engine expects.
        expected: (u32, u32),
        /// `(width, height)` that was supplied.
        actual: (u32, u32),
    },

    /// A required resource (e.g. the tile set) could not be produced.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    /// Build a [`FxError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FxError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`FxError::ResourceUnavailable`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Build a [`FxError::DimensionMismatch`] value.
    pub fn dimensions(expected: (u32, u32), actual: (u32, u32)) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
