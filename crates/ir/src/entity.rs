//! Entity definitions for data models
//!
//! This module contains the `Entity` struct: a named collection of typed
//! fields plus relations to other entities. Entities are plain values; the
//! migration engine compares snapshots of them and never mutates them.

use crate::field::Field;
use crate::naming;
use crate::relation::Relation;
use serde::{Deserialize, Serialize};

// ============================================================================
// Entity
// ============================================================================

/// Represents a data entity (maps to a database table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name (PascalCase, e.g., "User", "BlogPost")
    pub name: String,

    /// Fields (columns) in declaration order
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Relations to other entities
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

impl Entity {
    /// Create a new entity with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Add a field using builder pattern
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a relation using builder pattern
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Database table name (snake_case plural)
    pub fn table_name(&self) -> String {
        naming::table_name(&self.name)
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get a relation by name
    pub fn get_relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Get the primary key field
    pub fn primary_key(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary)
    }

    /// Check if entity has a specific field name
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Get the number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Find an entity by name in a snapshot
pub fn find_entity<'a>(entities: &'a [Entity], name: &str) -> Option<&'a Entity> {
    entities.iter().find(|e| e.name == name)
}

// ============================================================================
// Tests
// ============================================================================
