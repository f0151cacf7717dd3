//! Error types for ArchSync
//!
//! The differ and SQL generator never fail on well-formed input, so every
//! variant here belongs to the file-backed side of the engine: spec files,
//! the migration state store, migration files, and configuration.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for ArchSync
#[derive(Debug, Error)]
pub enum EngineError {
    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Entity spec file could not be found
    #[error("Entity spec not found at path: {0}")]
    SpecNotFound(PathBuf),

    /// Entity spec file is not a valid entity list
    #[error("Invalid entity spec '{path}': {message}")]
    InvalidSpec { path: PathBuf, message: String },

    /// Unknown dialect identifier
    #[error("Unknown dialect '{0}' (expected one of: postgresql, mysql, sqlite)")]
    UnknownDialect(String),

    /// Unknown field type identifier
    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),

    /// Migration file not found on disk
    #[error("Migration not found: {0}")]
    MigrationNotFound(String),

    // ========================================================================
    // State Errors
    // ========================================================================
    /// State file exists but cannot be parsed
    #[error("Migration state at '{path}' is corrupt: {message}")]
    StateCorrupt { path: PathBuf, message: String },

    /// State file was written by a newer engine
    #[error("Unsupported state version: expected {expected}, found {found}")]
    StateVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a corrupt-state error
    pub fn state_corrupt(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        EngineError::StateCorrupt {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid-spec error
    pub fn invalid_spec(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        EngineError::InvalidSpec {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error concerns the persisted migration state
    pub fn is_state(&self) -> bool {
        matches!(
            self,
            EngineError::StateCorrupt { .. } | EngineError::StateVersionMismatch { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::SpecNotFound(_) | EngineError::MigrationNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::Io(_)
                | EngineError::FileRead { .. }
                | EngineError::FileWrite { .. }
                | EngineError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
