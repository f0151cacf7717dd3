//! Core types used throughout ArchSync
//!
//! This module contains the vocabulary shared by the entity model, the
//! differ, and the SQL generator: field types, relation kinds, and the
//! supported SQL dialects.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Field Types
// ============================================================================

/// Logical data types supported for entity fields
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UUID (universally unique identifier)
    Uuid,
    /// Bounded-length string (VARCHAR)
    #[default]
    String,
    /// Long-form text content
    Text,
    /// Signed integer
    Integer,
    /// Fixed-point decimal
    Decimal,
    /// Boolean true/false
    Boolean,
    /// Date and time
    Timestamp,
    /// Date without time
    Date,
    /// JSON document
    Json,
    /// Enumeration, stored as a bounded string
    Enum,
}

impl FieldType {
    /// Identifier as written in entity specs
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Uuid => "uuid",
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Date => "date",
            FieldType::Json => "json",
            FieldType::Enum => "enum",
        }
    }

    /// Get all field types
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::Uuid,
            FieldType::String,
            FieldType::Text,
            FieldType::Integer,
            FieldType::Decimal,
            FieldType::Boolean,
            FieldType::Timestamp,
            FieldType::Date,
            FieldType::Json,
            FieldType::Enum,
        ]
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        FieldType::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| EngineError::UnknownFieldType(s.to_string()))
    }
}

// ============================================================================
// Relation Types
// ============================================================================

/// Entity relation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Owning side holds the foreign key (e.g., Post belongs to User)
    #[default]
    BelongsTo,
    /// One record relates to exactly one other record
    HasOne,
    /// One record relates to many others (e.g., User has many Posts)
    HasMany,
    /// Many-to-many through a junction table
    ManyToMany,
}

impl RelationType {
    /// Identifier as written in entity specs
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::BelongsTo => "belongs_to",
            RelationType::HasOne => "has_one",
            RelationType::HasMany => "has_many",
            RelationType::ManyToMany => "many_to_many",
        }
    }

    /// Get arrow symbol for textual representation
    pub fn arrow_symbol(&self) -> &'static str {
        match self {
            RelationType::BelongsTo => "* >─── 1",
            RelationType::HasOne => "1 ─── 1",
            RelationType::HasMany => "1 ───< *",
            RelationType::ManyToMany => "* >──< *",
        }
    }

    /// Check if this relation requires a junction table
    pub fn requires_junction_table(&self) -> bool {
        matches!(self, RelationType::ManyToMany)
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Dialects
// ============================================================================

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl Dialect {
    /// Stable identifier used in configuration and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SQLite => "sqlite",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::MySQL => "MySQL",
            Dialect::SQLite => "SQLite",
        }
    }

    /// Whether columns can be altered in place (type, nullability, default).
    ///
    /// SQLite can only add, drop and rename columns; anything else needs a
    /// table rebuild.
    pub fn supports_alter_column(&self) -> bool {
        !matches!(self, Dialect::SQLite)
    }

    /// Whether `CREATE INDEX IF NOT EXISTS` / `DROP INDEX IF EXISTS` are accepted
    pub fn supports_index_if_exists(&self) -> bool {
        !matches!(self, Dialect::MySQL)
    }

    /// SQL boolean literal
    pub fn bool_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (Dialect::PostgreSQL, true) => "TRUE",
            (Dialect::PostgreSQL, false) => "FALSE",
            (_, true) => "1",
            (_, false) => "0",
        }
    }

    /// Get all dialects, default first
    pub fn all() -> &'static [Dialect] {
        &[Dialect::PostgreSQL, Dialect::MySQL, Dialect::SQLite]
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Dialect {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSQL),
            "mysql" => Ok(Dialect::MySQL),
            "sqlite" => Ok(Dialect::SQLite),
            _ => Err(EngineError::UnknownDialect(s.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_type_parse() {
        assert_eq!("uuid".parse::<FieldType>().unwrap(), FieldType::Uuid);
        assert_eq!("Decimal".parse::<FieldType>().unwrap(), FieldType::Decimal);
        assert!("money".parse::<FieldType>().is_err());
    }

    #[test]
    fn test_field_type_serde() {
        let json = serde_json::to_string(&FieldType::Timestamp).unwrap();
        assert_eq!(json, "\"timestamp\"");
        let parsed: FieldType = serde_json::from_str("\"enum\"").unwrap();
        assert_eq!(parsed, FieldType::Enum);
    }

    #[test]
    fn test_field_type_all_round_trip_names() {
        for t in FieldType::all() {
            assert_eq!(t.as_str().parse::<FieldType>().unwrap(), *t);
        }
    }

    #[test]
    fn test_relation_type_serde() {
        let parsed: RelationType = serde_json::from_str("\"many_to_many\"").unwrap();
        assert_eq!(parsed, RelationType::ManyToMany);
        assert!(parsed.requires_junction_table());
        assert!(!RelationType::HasMany.requires_junction_table());
        assert_eq!(RelationType::BelongsTo.to_string(), "belongs_to");
    }

    #[test]
    fn test_dialect_default_is_first_listed() {
        assert_eq!(Dialect::default(), Dialect::PostgreSQL);
        assert_eq!(Dialect::all()[0], Dialect::default());
    }

    #[test]
    fn test_dialect_parse() {
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::PostgreSQL);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::MySQL);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::SQLite);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_dialect_capabilities() {
        assert!(Dialect::PostgreSQL.supports_alter_column());
        assert!(Dialect::MySQL.supports_alter_column());
        assert!(!Dialect::SQLite.supports_alter_column());
        assert!(!Dialect::MySQL.supports_index_if_exists());
    }

    #[test]
    fn test_bool_literal() {
        assert_eq!(Dialect::PostgreSQL.bool_literal(true), "TRUE");
        assert_eq!(Dialect::PostgreSQL.bool_literal(false), "FALSE");
        assert_eq!(Dialect::MySQL.bool_literal(true), "1");
        assert_eq!(Dialect::SQLite.bool_literal(false), "0");
    }
}
