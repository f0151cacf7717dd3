//! Relation definitions
//!
//! Relations link an entity to another entity by name. They are compared by
//! the differ but produce no DDL of their own.

use archsync_core::RelationType;
use serde::{Deserialize, Serialize};

/// A named relation from one entity to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name (unique within the owning entity)
    pub name: String,

    /// Target entity name
    pub entity: String,

    /// Relation kind
    #[serde(rename = "type")]
    pub relation_type: RelationType,

    /// Foreign key column, when not derived from the relation name
    #[serde(
        default,
        alias = "foreignKey",
        skip_serializing_if = "Option::is_none"
    )]
    pub foreign_key: Option<String>,

    /// Junction entity for many-to-many relations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<String>,
}

impl Relation {
    /// Create a new relation
    pub fn new(
        name: impl Into<String>,
        entity: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            name: name.into(),
            entity: entity.into(),
            relation_type,
            foreign_key: None,
            through: None,
        }
    }

    /// Create a belongs-to relation
    pub fn belongs_to(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::new(name, entity, RelationType::BelongsTo)
    }

    /// Create a has-many relation
    pub fn has_many(name: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::new(name, entity, RelationType::HasMany)
    }

    /// Set the foreign key column
    pub fn with_foreign_key(mut self, fk: impl Into<String>) -> Self {
        self.foreign_key = Some(fk.into());
        self
    }

    /// Set the junction entity
    pub fn through(mut self, entity: impl Into<String>) -> Self {
        self.through = Some(entity.into());
        self
    }

    /// Whether two relations with the same name point at the same thing.
    pub fn same_target(&self, other: &Relation) -> bool {
        self.entity == other.entity && self.relation_type == other.relation_type
    }
}
