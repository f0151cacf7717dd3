//! # Schema Differ
//!
//! Compares two entity snapshots and produces an ordered list of classified
//! [`SpecChange`]s. The comparison is pure: it performs no I/O and every
//! divergence between the snapshots is representable as a change, so it
//! never fails.
//!
//! ## Ordering
//!
//! ```text
//! for entity in new (declaration order):
//!     absent from old  → entity_added, then field_added per field
//!     present in old   → field changes (new order), field removals (old order),
//!                        relation changes
//! for entity in old but not in new → entity_removed
//! ```
//!
//! ## Classification
//!
//! | change                  | breaking when                                 |
//! |-------------------------|-----------------------------------------------|
//! | entity_added            | never                                         |
//! | entity_removed          | always                                        |
//! | field_added             | not nullable and no default                   |
//! | field_removed           | always                                        |
//! | field_type_changed      | `(old, new)` not in the compatibility list    |
//! | field_nullable_changed  | nullable → not nullable                       |
//! | field_default_changed   | never                                         |
//! | field_unique_changed    | not unique → unique                           |
//! | relation_added          | never                                         |
//! | relation_removed        | always                                        |

mod changes;
mod compat;

pub use changes::{ChangeType, ChangeValue, DiffResult, SpecChange};
pub use compat::TypeCompatibility;

use archsync_ir::{Entity, Field, Relation};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Differ
// ============================================================================

/// Structural comparison of entity snapshots
#[derive(Debug, Clone, Default)]
pub struct Differ {
    compat: TypeCompatibility,
}

impl Differ {
    /// Create a differ with a custom type-change whitelist
    pub fn new(compat: TypeCompatibility) -> Self {
        Self { compat }
    }

    /// The whitelist used to classify type changes
    pub fn compatibility(&self) -> &TypeCompatibility {
        &self.compat
    }

    /// Compare `old` to `new`
    pub fn diff(&self, old: &[Entity], new: &[Entity]) -> DiffResult {
        let old_by_name: HashMap<&str, &Entity> =
            old.iter().map(|e| (e.name.as_str(), e)).collect();
        let new_by_name: HashMap<&str, &Entity> =
            new.iter().map(|e| (e.name.as_str(), e)).collect();

        let mut changes = Vec::new();

        for entity in new {
            match old_by_name.get(entity.name.as_str()) {
                None => self.entity_added(entity, &mut changes),
                Some(previous) => {
                    self.diff_fields(previous, entity, &mut changes);
                    self.diff_relations(previous, entity, &mut changes);
                }
            }
        }

        for entity in old {
            if !new_by_name.contains_key(entity.name.as_str()) {
                changes.push(self.change(
                    ChangeType::EntityRemoved,
                    &entity.name,
                    None,
                    None,
                    None,
                    None,
                    format!("Removed entity '{}'", entity.name),
                ));
            }
        }

        let result = DiffResult::from_changes(changes);
        tracing::debug!(
            changes = result.len(),
            breaking = result.has_breaking_changes,
            "computed spec diff"
        );
        result
    }

    /// Classify a change from its kind and before/after values alone
    pub fn is_breaking(
        &self,
        change_type: ChangeType,
        old: Option<&ChangeValue>,
        new: Option<&ChangeValue>,
    ) -> bool {
        match change_type {
            ChangeType::EntityAdded
            | ChangeType::FieldDefaultChanged
            | ChangeType::RelationAdded => false,
            ChangeType::EntityRemoved | ChangeType::FieldRemoved | ChangeType::RelationRemoved => {
                true
            }
            ChangeType::FieldAdded => new
                .and_then(ChangeValue::as_field)
                .is_none_or(Field::requires_backfill),
            ChangeType::FieldTypeChanged => {
                match (
                    old.and_then(ChangeValue::as_type),
                    new.and_then(ChangeValue::as_type),
                ) {
                    (Some(from), Some(to)) => !self.compat.is_safe(from, to),
                    _ => true,
                }
            }
            ChangeType::FieldNullableChanged => {
                old.and_then(ChangeValue::as_flag) == Some(true)
                    && new.and_then(ChangeValue::as_flag) != Some(true)
            }
            ChangeType::FieldUniqueChanged => {
                old.and_then(ChangeValue::as_flag) != Some(true)
                    && new.and_then(ChangeValue::as_flag) == Some(true)
            }
        }
    }

    // ========================================================================
    // Entity level
    // ========================================================================

    fn entity_added(&self, entity: &Entity, changes: &mut Vec<SpecChange>) {
        changes.push(self.change(
            ChangeType::EntityAdded,
            &entity.name,
            None,
            None,
            None,
            None,
            format!(
                "Added entity '{}' with {} field(s)",
                entity.name,
                entity.fields.len()
            ),
        ));
        for field in &entity.fields {
            changes.push(self.field_added(&entity.name, field));
        }
    }

    // ========================================================================
    // Field level
    // ========================================================================

    fn diff_fields(&self, old: &Entity, new: &Entity, changes: &mut Vec<SpecChange>) {
        let old_fields: HashMap<&str, &Field> =
            old.fields.iter().map(|f| (f.name.as_str(), f)).collect();

        for field in &new.fields {
            match old_fields.get(field.name.as_str()) {
                None => changes.push(self.field_added(&new.name, field)),
                Some(previous) => self.diff_field(&new.name, previous, field, changes),
            }
        }

        for field in &old.fields {
            if !new.has_field(&field.name) {
                changes.push(self.change(
                    ChangeType::FieldRemoved,
                    &new.name,
                    Some(&field.name),
                    None,
                    Some(ChangeValue::Field(field.clone())),
                    None,
                    format!("Removed field '{}.{}'", new.name, field.name),
                ));
            }
        }
    }

    fn field_added(&self, entity: &str, field: &Field) -> SpecChange {
        let mut qualifiers = vec![field.field_type.to_string()];
        if field.nullable {
            qualifiers.push("nullable".to_string());
        }
        if let Some(default) = &field.default {
            qualifiers.push(format!("default {}", default));
        }
        self.change(
            ChangeType::FieldAdded,
            entity,
            Some(&field.name),
            None,
            None,
            Some(ChangeValue::Field(field.clone())),
            format!(
                "Added field '{}.{}' ({})",
                entity,
                field.name,
                qualifiers.join(", ")
            ),
        )
    }

    fn diff_field(&self, entity: &str, old: &Field, new: &Field, changes: &mut Vec<SpecChange>) {
        let name = Some(new.name.as_str());

        if old.field_type != new.field_type {
            changes.push(self.change(
                ChangeType::FieldTypeChanged,
                entity,
                name,
                None,
                Some(ChangeValue::Type(old.field_type)),
                Some(ChangeValue::Type(new.field_type)),
                format!(
                    "Changed type of '{}.{}' from {} to {}",
                    entity, new.name, old.field_type, new.field_type
                ),
            ));
        }

        if old.nullable != new.nullable {
            let verb = if new.nullable {
                "nullable"
            } else {
                "non-nullable"
            };
            changes.push(self.change(
                ChangeType::FieldNullableChanged,
                entity,
                name,
                None,
                Some(ChangeValue::Flag(old.nullable)),
                Some(ChangeValue::Flag(new.nullable)),
                format!("Made '{}.{}' {}", entity, new.name, verb),
            ));
        }

        if old.default != new.default {
            changes.push(self.change(
                ChangeType::FieldDefaultChanged,
                entity,
                name,
                None,
                Some(ChangeValue::Default(old.default.clone())),
                Some(ChangeValue::Default(new.default.clone())),
                format!(
                    "Changed default of '{}.{}' from {} to {}",
                    entity,
                    new.name,
                    describe_default(&old.default),
                    describe_default(&new.default)
                ),
            ));
        }

        if old.unique != new.unique {
            let verb = if new.unique {
                "Added unique constraint to"
            } else {
                "Dropped unique constraint from"
            };
            changes.push(self.change(
                ChangeType::FieldUniqueChanged,
                entity,
                name,
                None,
                Some(ChangeValue::Flag(old.unique)),
                Some(ChangeValue::Flag(new.unique)),
                format!("{} '{}.{}'", verb, entity, new.name),
            ));
        }
    }

    // ========================================================================
    // Relation level
    // ========================================================================

    fn diff_relations(&self, old: &Entity, new: &Entity, changes: &mut Vec<SpecChange>) {
        for relation in &new.relations {
            match old.get_relation(&relation.name) {
                None => changes.push(self.relation_added(&new.name, relation)),
                Some(previous) if !previous.same_target(relation) => {
                    changes.push(self.relation_removed(&new.name, previous));
                    changes.push(self.relation_added(&new.name, relation));
                }
                Some(_) => {}
            }
        }

        for relation in &old.relations {
            if new.get_relation(&relation.name).is_none() {
                changes.push(self.relation_removed(&new.name, relation));
            }
        }
    }

    fn relation_added(&self, entity: &str, relation: &Relation) -> SpecChange {
        self.change(
            ChangeType::RelationAdded,
            entity,
            None,
            Some(&relation.name),
            None,
            Some(ChangeValue::Relation(relation.clone())),
            format!(
                "Added relation '{}.{}' ({} {})",
                entity, relation.name, relation.relation_type, relation.entity
            ),
        )
    }

    fn relation_removed(&self, entity: &str, relation: &Relation) -> SpecChange {
        self.change(
            ChangeType::RelationRemoved,
            entity,
            None,
            Some(&relation.name),
            Some(ChangeValue::Relation(relation.clone())),
            None,
            format!(
                "Removed relation '{}.{}' ({} {})",
                entity, relation.name, relation.relation_type, relation.entity
            ),
        )
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn change(
        &self,
        change_type: ChangeType,
        entity: &str,
        field: Option<&str>,
        relation: Option<&str>,
        old_value: Option<ChangeValue>,
        new_value: Option<ChangeValue>,
        description: String,
    ) -> SpecChange {
        let breaking = self.is_breaking(change_type, old_value.as_ref(), new_value.as_ref());
        SpecChange {
            change_type,
            entity: entity.to_string(),
            field: field.map(str::to_string),
            relation: relation.map(str::to_string),
            old_value,
            new_value,
            breaking,
            description,
        }
    }
}

fn describe_default(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// Compare two snapshots with the default type-change whitelist.
pub fn diff(old: &[Entity], new: &[Entity]) -> DiffResult {
    Differ::default().diff(old, new)
}

// ============================================================================
// Tests
// ============================================================================
