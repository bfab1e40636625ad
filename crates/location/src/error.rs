//! Error types for the platform boundary.
//!
//! These errors never cross the service's public API; every operation
//! absorbs them into its total contract (`None`, `false`, or the fallback
//! address) after logging a diagnostic. They exist so platform
//! implementations can report *why* a fix or prompt failed.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for platform boundary calls.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Failures reported by a [`Platform`](crate::Platform) implementation.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The positioning hardware did not produce a fix in time
    #[error("Position fix timed out after {0:?}")]
    Timeout(Duration),

    /// Positioning is unavailable (hardware off, no signal)
    #[error("Positioning unavailable: {0}")]
    Unavailable(String),

    /// The platform backend returned an error
    #[error("Platform backend error: {0}")]
    Backend(String),
}

impl PlatformError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
