/// Convenience result type used across stockmotion.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Fewer than two usable samples, or an empty input time range.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Non-positive contribution amount or an empty smoothing window.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// A non-finite value reached a display-formatting boundary.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Cooperative cancellation observed mid-render.
    #[error("animation cancelled")]
    Cancelled,

    /// Invalid configuration or encode parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an [`Error::InsufficientData`] value.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Build an [`Error::InvalidPolicy`] value.
    pub fn invalid_policy(msg: impl Into<String>) -> Self {
        Self::InvalidPolicy(msg.into())
    }

    /// Build an [`Error::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build an [`Error::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
