//! Error types for lector
//!
//! Defines engine-specific error types using thiserror for clear error propagation.
//!
//! The span indexer and offset translation are total functions and never
//! produce these errors; everything here surfaces at the playback engine
//! boundary. A canceled narration is an expected outcome of stop/pause/seek
//! and is deliberately absent from this taxonomy.

use thiserror::Error;

/// Main error type for the lector engine
#[derive(Error, Debug)]
pub enum Error {
    /// Nothing to narrate (user-facing, non-fatal)
    #[error("Nothing to read: the document has no narratable text")]
    EmptyContent,

    /// Narration capability unusable; blocks play() before any call is made
    #[error("Narration is not configured")]
    NotConfigured,

    /// Capability-reported narration failure; the session ends, no retry
    #[error("Narration failed: {0}")]
    NarrationFailed(String),

    /// Operation not valid in the current playback state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Reading unit id not present in the current index
    #[error("Reading unit not found: {0}")]
    UnitNotFound(String),

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using the lector Error
pub type Result<T> = std::result::Result<T, Error>;
