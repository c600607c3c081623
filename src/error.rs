//! Error types for ZVFS
//!
//! Provides a unified error type for all container operations.

use thiserror::Error;

/// Result type alias using ZvfsError
pub type Result<T> = std::result::Result<T, ZvfsError>;

/// Unified error type for ZVFS operations
#[derive(Debug, Error)]
pub enum ZvfsError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("File name too long: {0} bytes (max {})", crate::layout::NAME_FIELD_SIZE)]
    NameTooLong(usize),

    #[error("Refusing to store empty file: {0}")]
    EmptyFile(String),

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("Entry table is full")]
    TableFull,

    #[error("Data region full: {length} bytes at offset {start} exceed the 32-bit offset space")]
    DataRegionFull { start: u64, length: u64 },

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
