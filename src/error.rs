//! Error types for the repetition counting library.
//!
//! Only configuration-time problems are errors. Bad per-frame input is never
//! surfaced here; see [`crate::processor::SkipReason`].

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Exercise profile failed validation at registration time
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// A profile with the same identifier is already registered
    #[error("Duplicate profile: {0}")]
    DuplicateProfile(String),

    /// No profile registered under the requested identifier
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// Smoothing filter initialization error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
