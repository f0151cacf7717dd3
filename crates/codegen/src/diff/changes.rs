//! Types for representing schema changes between two entity snapshots.

use archsync_core::FieldType;
use archsync_ir::{Field, Relation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ChangeType
// ============================================================================

/// Kind of a single spec change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    EntityAdded,
    EntityRemoved,
    FieldAdded,
    FieldRemoved,
    FieldTypeChanged,
    FieldNullableChanged,
    FieldDefaultChanged,
    FieldUniqueChanged,
    RelationAdded,
    RelationRemoved,
}

impl ChangeType {
    /// Identifier as serialized (`field_type_changed`, …)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::EntityAdded => "entity_added",
            ChangeType::EntityRemoved => "entity_removed",
            ChangeType::FieldAdded => "field_added",
            ChangeType::FieldRemoved => "field_removed",
            ChangeType::FieldTypeChanged => "field_type_changed",
            ChangeType::FieldNullableChanged => "field_nullable_changed",
            ChangeType::FieldDefaultChanged => "field_default_changed",
            ChangeType::FieldUniqueChanged => "field_unique_changed",
            ChangeType::RelationAdded => "relation_added",
            ChangeType::RelationRemoved => "relation_removed",
        }
    }

    /// Counted as an addition in summaries
    pub fn is_addition(&self) -> bool {
        self.as_str().contains("added")
    }

    /// Counted as a removal in summaries
    pub fn is_removal(&self) -> bool {
        self.as_str().contains("removed")
    }

    /// Counted as a modification in summaries
    pub fn is_modification(&self) -> bool {
        self.as_str().contains("changed")
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ChangeValue
// ============================================================================

/// Before/after payload carried by a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChangeValue {
    /// A whole field definition (added/removed fields)
    Field(Field),
    /// A whole relation definition (added/removed relations)
    Relation(Relation),
    /// A field type
    Type(FieldType),
    /// A boolean flag such as `nullable` or `unique`
    Flag(bool),
    /// A default value; `None` means no default
    Default(Option<Value>),
}

impl ChangeValue {
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            ChangeValue::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<FieldType> {
        match self {
            ChangeValue::Type(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            ChangeValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_default(&self) -> Option<&Option<Value>> {
        match self {
            ChangeValue::Default(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// SpecChange
// ============================================================================

/// One classified difference between two entity snapshots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecChange {
    /// Kind of change
    #[serde(rename = "type")]
    pub change_type: ChangeType,

    /// Entity the change belongs to
    pub entity: String,

    /// Field name, for field-level changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Relation name, for relation-level changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,

    /// Value before the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ChangeValue>,

    /// Value after the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<ChangeValue>,

    /// Whether the change may be incompatible with existing data
    pub breaking: bool,

    /// Human-readable description
    pub description: String,
}

impl SpecChange {
    /// `Entity.field` or `Entity.relation` label used in messages
    pub fn target(&self) -> String {
        match (&self.field, &self.relation) {
            (Some(field), _) => format!("{}.{}", self.entity, field),
            (None, Some(rel)) => format!("{}.{}", self.entity, rel),
            (None, None) => self.entity.clone(),
        }
    }

    pub fn old_type(&self) -> Option<FieldType> {
        self.old_value.as_ref().and_then(ChangeValue::as_type)
    }

    pub fn new_type(&self) -> Option<FieldType> {
        self.new_value.as_ref().and_then(ChangeValue::as_type)
    }

    pub fn old_flag(&self) -> Option<bool> {
        self.old_value.as_ref().and_then(ChangeValue::as_flag)
    }

    pub fn new_flag(&self) -> Option<bool> {
        self.new_value.as_ref().and_then(ChangeValue::as_flag)
    }
}

// ============================================================================
// DiffResult
// ============================================================================

/// Ordered, classified change set plus a human-readable tally
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// All changes in detection order
    pub changes: Vec<SpecChange>,

    /// True iff any change is breaking
    pub has_breaking_changes: bool,

    /// One line per non-empty category, e.g. `+ 3 additions`
    pub summary: Vec<String>,
}

impl DiffResult {
    /// Build a result, deriving the breaking flag and summary from `changes`
    pub fn from_changes(changes: Vec<SpecChange>) -> Self {
        let has_breaking_changes = changes.iter().any(|c| c.breaking);
        let summary = summarize(&changes);
        Self {
            changes,
            has_breaking_changes,
            summary,
        }
    }

    /// Whether the two snapshots were identical
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Only the breaking changes
    pub fn breaking_changes(&self) -> Vec<&SpecChange> {
        self.changes.iter().filter(|c| c.breaking).collect()
    }

    /// Changes of one kind
    pub fn changes_of_type(&self, change_type: ChangeType) -> Vec<&SpecChange> {
        self.changes
            .iter()
            .filter(|c| c.change_type == change_type)
            .collect()
    }

    /// Changes touching one entity
    pub fn changes_for_entity(&self, entity: &str) -> Vec<&SpecChange> {
        self.changes.iter().filter(|c| c.entity == entity).collect()
    }
}

fn summarize(changes: &[SpecChange]) -> Vec<String> {
    let additions = changes.iter().filter(|c| c.change_type.is_addition()).count();
    let removals = changes.iter().filter(|c| c.change_type.is_removal()).count();
    let modifications = changes
        .iter()
        .filter(|c| c.change_type.is_modification())
        .count();
    let breaking = changes.iter().filter(|c| c.breaking).count();

    let mut lines = Vec::new();
    if additions > 0 {
        lines.push(format!("+ {} {}", additions, plural(additions, "addition")));
    }
    if removals > 0 {
        lines.push(format!("- {} {}", removals, plural(removals, "removal")));
    }
    if modifications > 0 {
        lines.push(format!(
            "~ {} {}",
            modifications,
            plural(modifications, "modification")
        ));
    }
    if breaking > 0 {
        lines.push(format!(
            "! {} breaking {}",
            breaking,
            plural(breaking, "change")
        ));
    }
    lines
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

// ============================================================================
// Tests
// ============================================================================
