//! # Error Handling
//!
//! Error types for Gobia Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Core Errors                                                       │
//! │  │   ├── NotInitialized        - Core not initialized                  │
//! │  │   └── AlreadyInitialized    - Core already initialized              │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageReadError      - Backend read failed                   │
//! │  │   ├── StorageWriteError     - Backend write failed                  │
//! │  │   ├── StorageCorrupted      - Stored document does not parse        │
//! │  │   └── DatabaseError         - SQLite failure                        │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── Internal              - Should not happen                     │
//! │      ├── SerializationError    - Value could not be encoded            │
//! │      └── DeserializationError  - Value could not be decoded            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Read vs. Write Policy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ERROR HANDLING FLOW                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  get_* / is_*      Err(..) ──► warn! ──► safe default (empty / None)   │
//! │                                                                         │
//! │  save_* / delete_* Err(..) ──► error! ──► Err(..) to the caller        │
//! │                                                                         │
//! │  Host bridge:  Err(Error::StorageWriteError) → { code: 402, ... }      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for Gobia Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Gobia Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Core Lifecycle Errors (100-199)
    // ========================================================================

    /// Core has not been initialized
    #[error("Gobia Core has not been initialized. Call gobia_init() first.")]
    NotInitialized,

    /// Core has already been initialized
    #[error("Gobia Core has already been initialized.")]
    AlreadyInitialized,

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Failed to read from storage
    #[error("Failed to read from storage: {0}")]
    StorageReadError(String),

    /// Failed to write to storage
    #[error("Failed to write to storage: {0}")]
    StorageWriteError(String),

    /// A stored document could not be parsed
    #[error("Stored data under {key} is corrupted: {reason}")]
    StorageCorrupted {
        /// Storage key holding the document
        key: String,
        /// Parser message
        reason: String,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl Error {
    /// Get the error code for FFI
    ///
    /// - 100-199: Core lifecycle
    /// - 400-499: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::NotInitialized => 100,
            Error::AlreadyInitialized => 101,

            Error::StorageReadError(_) => 401,
            Error::StorageWriteError(_) => 402,
            Error::StorageCorrupted { .. } => 403,
            Error::DatabaseError(_) => 405,

            Error::Internal(_) => 900,
            Error::SerializationError(_) => 902,
            Error::DeserializationError(_) => 903,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Backend I/O failures are transient; retrying the same operation
    /// later may succeed. Corrupted documents and encoding failures will not.
    pub fn is_recoverable(&self) -> bool {
        is_recoverable_code(self.code())
    }
}

/// Whether an error code names a transient backend failure
/// (read 401, write 402, database 405).
pub fn is_recoverable_code(code: i32) -> bool {
    matches!(code, 401 | 402 | 405)
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// FFI ERROR REPRESENTATION
// ============================================================================

/// FFI-friendly error representation
#[derive(Debug, Clone)]
pub struct FfiError {
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the error is recoverable
    pub recoverable: bool,
}

impl FfiError {
    /// Build from a code and message, classifying the code
    pub fn from_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            recoverable: is_recoverable_code(code),
        }
    }
}

impl From<Error> for FfiError {
    fn from(err: Error) -> Self {
        Self::from_code(err.code(), err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
