//! Display sink failures.
//!
//! Display output is best-effort: these errors are logged by the consumer
//! and never reach the servo loop.

/// Errors reported by a display sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DisplayError {
    /// The sink has been closed and accepts no more frames
    #[error("Display closed")]
    Closed,

    /// The rendering backend failed
    #[error("Display backend error: {0}")]
    Backend(String),
}

impl DisplayError {
    /// Create a backend error.
    pub fn backend(reason: impl Into<String>) -> Self {
        DisplayError::Backend(reason.into())
    }

    /// Check whether further updates can never succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DisplayError::Closed)
    }
}
