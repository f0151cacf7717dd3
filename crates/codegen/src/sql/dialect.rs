//! Per-dialect SQL vocabulary: column types, audit columns, literals.

use archsync_core::{Dialect, FieldType};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Type Map
// ============================================================================

/// `FieldType → SQL type` table for one dialect
///
/// The built-in tables are a starting point; individual entries can be
/// overridden at construction time without touching the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMap {
    types: BTreeMap<FieldType, String>,
}

impl TypeMap {
    /// The built-in table for `dialect`
    pub fn for_dialect(dialect: Dialect) -> Self {
        let types = FieldType::all()
            .iter()
            .map(|ty| (*ty, builtin_type(dialect, *ty).to_string()))
            .collect();
        Self { types }
    }

    /// Replace the SQL type used for `field_type`
    pub fn with_override(mut self, field_type: FieldType, sql_type: impl Into<String>) -> Self {
        self.types.insert(field_type, sql_type.into());
        self
    }

    /// SQL type for a field type
    pub fn sql_type(&self, field_type: FieldType) -> &str {
        self.types
            .get(&field_type)
            .map(String::as_str)
            .unwrap_or("TEXT")
    }
}

fn builtin_type(dialect: Dialect, field_type: FieldType) -> &'static str {
    match dialect {
        Dialect::PostgreSQL => match field_type {
            FieldType::Uuid => "UUID",
            FieldType::String => "VARCHAR(255)",
            FieldType::Text => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Decimal => "DECIMAL(10,2)",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Date => "DATE",
            FieldType::Json => "JSONB",
            FieldType::Enum => "VARCHAR(50)",
        },
        Dialect::MySQL => match field_type {
            FieldType::Uuid => "CHAR(36)",
            FieldType::String => "VARCHAR(255)",
            FieldType::Text => "TEXT",
            FieldType::Integer => "INT",
            FieldType::Decimal => "DECIMAL(10,2)",
            FieldType::Boolean => "TINYINT(1)",
            FieldType::Timestamp => "DATETIME",
            FieldType::Date => "DATE",
            FieldType::Json => "JSON",
            FieldType::Enum => "VARCHAR(50)",
        },
        Dialect::SQLite => match field_type {
            FieldType::Integer | FieldType::Boolean => "INTEGER",
            FieldType::Decimal => "REAL",
            FieldType::Enum => "VARCHAR(50)",
            _ => "TEXT",
        },
    }
}

// ============================================================================
// Audit Columns
// ============================================================================

/// Implicit columns appended to every created table
pub const AUDIT_COLUMNS: [&str; 2] = ["created_at", "updated_at"];

/// Full column clause for an audit column
pub fn audit_column(dialect: Dialect, column: &str) -> String {
    match dialect {
        Dialect::PostgreSQL => format!("{} TIMESTAMP NOT NULL DEFAULT NOW()", column),
        Dialect::MySQL if column == "updated_at" => format!(
            "{} DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP",
            column
        ),
        Dialect::MySQL => format!("{} DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP", column),
        Dialect::SQLite => format!("{} TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP", column),
    }
}

// ============================================================================
// Literals
// ============================================================================

/// Render a default value as a SQL literal
///
/// Defaults on `json` fields are serialized and quoted whatever their shape.
pub fn format_literal(value: &Value, field_type: FieldType, dialect: Dialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        _ if field_type == FieldType::Json => quote(&value.to_string()),
        Value::Bool(b) => dialect.bool_literal(*b).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(_) | Value::Object(_) => quote(&value.to_string()),
    }
}

/// Single-quote a string, doubling embedded quotes
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
