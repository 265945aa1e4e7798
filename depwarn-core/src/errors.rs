//! Error types for `depwarn_core`.
//!
//! A deprecated call never fails because of the wrapper.  The only fallible
//! piece is the diagnostic stream itself, so [`DeprecationError`] is what
//! sink implementations return.  The emitter logs these and carries on;
//! they are never handed back to the caller of a wrapped function.

use thiserror::Error;

/// Top-level error type for the `depwarn_core` library.
#[derive(Debug, Error)]
pub enum DeprecationError {
    /// Writing a diagnostic chunk to the stream failed.
    #[error("SinkError: {0}")]
    Sink(String),
}

/// Convert an I/O failure on the diagnostic stream into a
/// `DeprecationError::Sink`.
impl From<std::io::Error> for DeprecationError {
    fn from(err: std::io::Error) -> Self {
        DeprecationError::Sink(format!("diagnostic stream write failed: {err}"))
    }
}
