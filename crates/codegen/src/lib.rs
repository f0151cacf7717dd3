//! # ArchSync Codegen
//!
//! The schema-evolution engine: compares entity snapshots, turns the changes
//! into dialect-specific SQL, and keeps a durable record of what has been
//! generated and applied.
//!
//! ## Components
//!
//! - **Differ** ([`diff`]): classified change set between two entity lists
//! - **SQL Generator** ([`sql`]): `up`/`down` DDL for PostgreSQL, MySQL, SQLite
//! - **Migration Manager** ([`migrations`]): state file, migration files, history
//!
//! ```text
//! state.lastSnapshot ─┐
//!                     ├─▶ Differ ─▶ DiffResult ─▶ SqlGenerator ─▶ MigrationOutput ─▶ file
//! current entities ───┘
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod diff;
pub mod migrations;
pub mod sql;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{CONFIG_FILE_NAME, SyncConfig, TypeChangeRule};
pub use diff::{ChangeType, ChangeValue, DiffResult, Differ, SpecChange, TypeCompatibility};
pub use migrations::{
    Direction, GeneratedMigration, MigrationFile, MigrationManager, MigrationRecord,
    MigrationState, MigrationStatus, StateLoad,
};
pub use sql::{MigrationOutput, SqlGenerator, TypeMap};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Tests
// ============================================================================
