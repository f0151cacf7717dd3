//! # Migration Management
//!
//! Durable snapshot/history state and the migration file lifecycle.
//!
//! ## Files
//!
//! ```text
//! <root>/
//! ├── archsync.toml                      optional configuration
//! ├── .archsync/migration-state.json     last snapshot + history
//! └── migrations/
//!     ├── 20240309140501_create_users.sql
//!     └── 20240309140502_add_bio.sql
//! ```
//!
//! State and migration files are written to a sibling temp file and renamed
//! into place. Concurrent writers against the same state file are not
//! supported.

pub mod file;
pub mod manager;
pub mod state;

pub use file::{MigrationFile, fingerprint, format_migration};
pub use manager::{GeneratedMigration, MigrationManager, MigrationStatus};
pub use state::{Direction, MigrationRecord, MigrationState, StateLoad, StateStore};
