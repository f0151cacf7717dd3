//! Field definitions for entity properties
//!
//! This module contains the `Field` struct for defining the typed
//! properties (columns) of an entity.

use crate::naming::to_snake_case;
use archsync_core::FieldType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ============================================================================
// Field
// ============================================================================

/// Represents a field within an entity (maps to a database column)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name (camelCase or snake_case as written in the spec)
    pub name: String,

    /// Logical data type of the field
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether this is the primary key
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary: bool,

    /// Whether the field must be unique
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,

    /// Whether the column accepts NULL (unset means NOT NULL)
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,

    /// Default value; `Some(Value::Null)` is an explicit `null` default,
    /// `None` means no default was given.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

impl Field {
    /// Create a new non-nullable field with the given name and type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            primary: false,
            unique: false,
            nullable: false,
            default: None,
        }
    }

    /// Create a UUID primary key field named `id`
    pub fn primary_key() -> Self {
        Self::new("id", FieldType::Uuid).primary()
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as the primary key
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the field as nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Database column name (snake_case)
    pub fn column_name(&self) -> String {
        to_snake_case(&self.name)
    }

    /// Whether the field has a default value
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Whether adding this column to a populated table needs a value the
    /// database cannot supply (non-nullable without a default)
    pub fn requires_backfill(&self) -> bool {
        !self.nullable && self.default.is_none()
    }
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Keep an explicit JSON `null` distinct from an absent key.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// ============================================================================
// Tests
// ============================================================================
