//! # ArchSync IR (Entity Model)
//!
//! This crate provides the entity model consumed by the migration engine.
//! Entity lists are produced by an external spec loader and treated as
//! immutable snapshots here.
//!
//! ## Core Concepts
//!
//! - **Entity**: A data model that maps to a database table (e.g., User, Post)
//! - **Field**: A typed property of an entity that maps to a column
//! - **Relation**: A named link from one entity to another
//! - **Naming**: Table and column name conventions (snake_case, plural tables)
//!

// Module declarations
pub mod entity;
pub mod field;
pub mod naming;
pub mod relation;
pub mod serialization;

// Re-export commonly used types at crate root
pub use entity::{Entity, find_entity};
pub use field::Field;
pub use naming::{column_name, table_name, to_snake_case};
pub use relation::Relation;
pub use serialization::{EntitySpecFile, entities_from_str, load_entities, save_entities};

// Re-export core types that are commonly used with IR
pub use archsync_core::{Dialect, EngineError, EngineResult, FieldType, RelationType};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Dialect, EngineError, EngineResult, Entity, Field, FieldType, Relation, RelationType,
        table_name,
    };
}
