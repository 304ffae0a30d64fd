//! Error types for the stowage catalog and record store.
//!
//! Every operation returns a closed set of outcomes; success is `Ok(..)` and
//! everything else is a variant below. Filesystem faults are converted to
//! `Io` at the smallest possible scope and never propagate as panics.

use thiserror::Error;

/// Path registry operation outcomes other than success.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry not initialized; call initialize() first")]
    NotInitialized,

    #[error("Registry already initialized; initialization is accepted exactly once")]
    AlreadyInitialized,

    #[error("No catalog entry matches clue '{0}'")]
    MissingElement(String),

    #[error("Element already cataloged: {0}")]
    ElementAlreadyExists(String),

    #[error("Cataloged entries were missing on disk and have been recreated")]
    DirectoryCorrupted,

    #[error("Filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Record store operation outcomes other than success.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store requires an initialized registry")]
    RegistryNotInitialized,

    #[error("No catalog entry matches clue '{0}'")]
    MissingElement(String),

    #[error("Entry '{0}' is a directory, expected a file")]
    InvalidElementType(String),

    #[error("Line index {line} out of range for file with {len} lines")]
    FileIndexOverflow { line: usize, len: usize },

    #[error("File is unreadable with the configured codec: {0}")]
    FileUnreadable(String),

    #[error("Encryption key changes are rejected while the safety lock is set")]
    SafetyEnabled,

    #[error("Codec failure: {0}")]
    Codec(#[from] crate::codec::CodecError),

    #[error("Filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}
