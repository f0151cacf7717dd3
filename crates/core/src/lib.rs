//! # ArchSync Core
//!
//! Core types and error handling for ArchSync.
//!
//! This crate provides the foundational building blocks used throughout
//! the engine, including:
//!
//! - **Types**: Field types, relation kinds, and SQL dialects
//! - **Errors**: Unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use types::{Dialect, FieldType, RelationType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
