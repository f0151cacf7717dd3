//! # SQL Generation
//!
//! Translates a [`DiffResult`] into forward (`up`) and reverse (`down`) DDL
//! for one dialect. Generation never fails: dialect capability gaps and
//! irreversible operations become SQL comments plus entries in
//! [`MigrationOutput::warnings`].
//!
//! ## Dispatch
//!
//! | change                 | up                                 | down                      |
//! |------------------------|------------------------------------|---------------------------|
//! | entity_added           | `CREATE TABLE`                     | `DROP TABLE IF EXISTS`    |
//! | entity_removed         | `DROP TABLE IF EXISTS`             | comment placeholder       |
//! | field_added            | `ADD COLUMN`                       | `DROP COLUMN`             |
//! | field_removed          | `DROP COLUMN`                      | comment placeholder       |
//! | field_type_changed     | alter type                         | alter back                |
//! | field_nullable_changed | set/drop not null                  | inverse                   |
//! | field_default_changed  | set/drop default                   | inverse                   |
//! | field_unique_changed   | create/drop unique index           | inverse                   |
//! | relation_*             | nothing                            | nothing                   |
//!
//! `down` lists statements in reverse change order.

mod dialect;

pub use dialect::{AUDIT_COLUMNS, TypeMap, audit_column, format_literal, quote};

use crate::diff::{ChangeType, ChangeValue, DiffResult, SpecChange};
use archsync_core::{Dialect, FieldType};
use archsync_ir::{Entity, Field, column_name, find_entity, table_name};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

// ============================================================================
// Output
// ============================================================================

/// SQL produced for one change set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOutput {
    /// Forward statements
    pub up: Vec<String>,
    /// Reverse statements, last change first
    pub down: Vec<String>,
    /// Summary of the change set
    pub description: String,
    /// A table or column is dropped
    pub has_destructive_changes: bool,
    /// Everything a reviewer should look at before applying
    pub warnings: Vec<String>,
}

impl MigrationOutput {
    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }
}

/// Statements produced for a single change
#[derive(Default)]
struct Step {
    up: Vec<String>,
    down: Vec<String>,
}

impl Step {
    fn new(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self {
            up: vec![up.into()],
            down: vec![down.into()],
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// DDL generator for one dialect
#[derive(Debug, Clone)]
pub struct SqlGenerator {
    dialect: Dialect,
    types: TypeMap,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

impl SqlGenerator {
    /// Generator with the built-in type table for `dialect`
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            types: TypeMap::for_dialect(dialect),
        }
    }

    /// Replace the type table
    pub fn with_type_map(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn type_map(&self) -> &TypeMap {
        &self.types
    }

    /// Generate `up`/`down` SQL for `diff`, resolving tables and columns
    /// against the current `entities`
    pub fn generate(&self, diff: &DiffResult, entities: &[Entity]) -> MigrationOutput {
        let created: HashSet<&str> = diff
            .changes
            .iter()
            .filter(|c| c.change_type == ChangeType::EntityAdded)
            .map(|c| c.entity.as_str())
            .collect();

        let mut up = Vec::new();
        let mut down_steps = Vec::new();
        let mut warnings = Vec::new();

        for change in &diff.changes {
            // columns of a new table are part of its CREATE TABLE
            if change.change_type == ChangeType::FieldAdded
                && created.contains(change.entity.as_str())
            {
                continue;
            }
            let step = self.step(change, &diff.changes, entities, &mut warnings);
            up.extend(step.up);
            down_steps.push(step.down);
        }

        let mut down: Vec<String> = down_steps.into_iter().rev().flatten().collect();
        // a field with several attribute changes restates the same MODIFY
        up.dedup();
        down.dedup();

        let has_destructive_changes = diff.changes.iter().any(|c| {
            matches!(
                c.change_type,
                ChangeType::EntityRemoved | ChangeType::FieldRemoved
            )
        });

        let description = if diff.summary.is_empty() {
            "No changes".to_string()
        } else {
            diff.summary.join(", ")
        };

        MigrationOutput {
            up,
            down,
            description,
            has_destructive_changes,
            warnings,
        }
    }

    /// Full `CREATE TABLE` statement for an entity
    pub fn create_table(&self, entity: &Entity) -> String {
        let mut columns: Vec<String> = entity
            .fields
            .iter()
            .map(|f| self.column_definition(f))
            .collect();

        for audit in AUDIT_COLUMNS {
            if !entity.fields.iter().any(|f| f.column_name() == audit) {
                columns.push(audit_column(self.dialect, audit));
            }
        }

        format!(
            "CREATE TABLE {} ({});",
            entity.table_name(),
            columns.join(", ")
        )
    }

    /// Column clause as used in `CREATE TABLE` and `ADD COLUMN`
    pub fn column_definition(&self, field: &Field) -> String {
        let mut def = format!(
            "{} {}",
            field.column_name(),
            self.types.sql_type(field.field_type)
        );
        if field.primary {
            def.push_str(" PRIMARY KEY");
        }
        if !field.nullable && !field.primary {
            def.push_str(" NOT NULL");
        }
        if field.unique && !field.primary {
            def.push_str(" UNIQUE");
        }
        if let Some(value) = &field.default {
            def.push_str(" DEFAULT ");
            def.push_str(&format_literal(value, field.field_type, self.dialect));
        }
        def
    }

    // ========================================================================
    // Per-change dispatch
    // ========================================================================

    fn step(
        &self,
        change: &SpecChange,
        changes: &[SpecChange],
        entities: &[Entity],
        warnings: &mut Vec<String>,
    ) -> Step {
        let table = table_name(&change.entity);

        match change.change_type {
            ChangeType::EntityAdded => match find_entity(entities, &change.entity) {
                Some(entity) => {
                    Step::new(self.create_table(entity), drop_table(&table))
                }
                None => {
                    warnings.push(format!(
                        "Entity '{}' is missing from the current entities; CREATE TABLE {} skipped",
                        change.entity, table
                    ));
                    Step::new(
                        format!("-- CREATE TABLE {} skipped: entity '{}' not found", table, change.entity),
                        format!("-- DROP TABLE {} skipped", table),
                    )
                }
            },

            ChangeType::EntityRemoved => {
                warnings.push(format!(
                    "Dropping table '{}' permanently destroys all of its data",
                    table
                ));
                Step::new(
                    drop_table(&table),
                    format!(
                        "-- Cannot restore dropped table {}; recreate it and its data manually",
                        table
                    ),
                )
            }

            ChangeType::FieldAdded => self.add_column(change, &table, entities, warnings),

            ChangeType::FieldRemoved => {
                let column = column_of(change);
                warnings.push(format!(
                    "Dropping column '{}.{}' permanently destroys its data",
                    table, column
                ));
                Step::new(
                    format!("ALTER TABLE {} DROP COLUMN {};", table, column),
                    format!(
                        "-- Cannot restore dropped column {}.{}; re-add it and its data manually",
                        table, column
                    ),
                )
            }

            ChangeType::FieldTypeChanged => {
                self.alter_type(change, changes, &table, entities, warnings)
            }

            ChangeType::FieldNullableChanged => {
                self.alter_nullable(change, changes, &table, entities, warnings)
            }

            ChangeType::FieldDefaultChanged => {
                self.alter_default(change, &table, entities, warnings)
            }

            ChangeType::FieldUniqueChanged => self.alter_unique(change, &table, warnings),

            ChangeType::RelationAdded | ChangeType::RelationRemoved => Step::default(),
        }
    }

    fn add_column(
        &self,
        change: &SpecChange,
        table: &str,
        entities: &[Entity],
        warnings: &mut Vec<String>,
    ) -> Step {
        let column = column_of(change);
        let field = change
            .new_value
            .as_ref()
            .and_then(ChangeValue::as_field)
            .or_else(|| current_field(entities, change));

        let Some(field) = field else {
            warnings.push(format!(
                "Field '{}' is missing from the current entities; ADD COLUMN skipped",
                change.target()
            ));
            return Step::new(
                format!("-- ADD COLUMN {}.{} skipped: field not found", table, column),
                format!("-- DROP COLUMN {}.{} skipped", table, column),
            );
        };

        if change.breaking {
            warnings.push(format!(
                "Adding non-nullable column '{}.{}' without a default fails on tables that already have rows",
                table, column
            ));
        }

        Step::new(
            format!(
                "ALTER TABLE {} ADD COLUMN {};",
                table,
                self.column_definition(field)
            ),
            format!("ALTER TABLE {} DROP COLUMN {};", table, column),
        )
    }

    fn alter_type(
        &self,
        change: &SpecChange,
        changes: &[SpecChange],
        table: &str,
        entities: &[Entity],
        warnings: &mut Vec<String>,
    ) -> Step {
        let column = column_of(change);
        let (Some(from), Some(to)) = (change.old_type(), change.new_type()) else {
            return self.missing_values(change, warnings);
        };

        if change.breaking {
            warnings.push(format!(
                "Changing '{}.{}' from {} to {} may fail or lose data",
                table, column, from, to
            ));
        }

        match self.dialect {
            Dialect::PostgreSQL => {
                let alter = |ty: FieldType| {
                    format!(
                        "ALTER TABLE {} ALTER COLUMN {} TYPE {};",
                        table,
                        column,
                        self.types.sql_type(ty)
                    )
                };
                Step::new(alter(to), alter(from))
            }
            Dialect::MySQL => {
                let Some(field) = current_field(entities, change) else {
                    return self.missing_field(change, table, warnings);
                };
                let before = previous_field(field, change, changes);
                Step::new(
                    self.modify_column(table, field),
                    self.modify_column(table, &before),
                )
            }
            Dialect::SQLite => self.unsupported(
                change,
                table,
                format!("change type of {} from {} to {}", column, from, to),
                format!("change type of {} from {} back to {}", column, to, from),
                warnings,
            ),
        }
    }

    fn alter_nullable(
        &self,
        change: &SpecChange,
        changes: &[SpecChange],
        table: &str,
        entities: &[Entity],
        warnings: &mut Vec<String>,
    ) -> Step {
        let column = column_of(change);
        let (Some(was), Some(now)) = (change.old_flag(), change.new_flag()) else {
            return self.missing_values(change, warnings);
        };

        if change.breaking {
            warnings.push(format!(
                "Making '{}.{}' NOT NULL fails if existing rows contain NULL",
                table, column
            ));
        }

        match self.dialect {
            Dialect::PostgreSQL => {
                let toggle = |nullable: bool| {
                    let action = if nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
                    format!("ALTER TABLE {} ALTER COLUMN {} {};", table, column, action)
                };
                Step::new(toggle(now), toggle(was))
            }
            Dialect::MySQL => {
                let Some(field) = current_field(entities, change) else {
                    return self.missing_field(change, table, warnings);
                };
                let before = previous_field(field, change, changes);
                Step::new(
                    self.modify_column(table, field),
                    self.modify_column(table, &before),
                )
            }
            Dialect::SQLite => {
                let describe = |nullable: bool| if nullable { "nullable" } else { "NOT NULL" };
                self.unsupported(
                    change,
                    table,
                    format!("make {} {}", column, describe(now)),
                    format!("make {} {}", column, describe(was)),
                    warnings,
                )
            }
        }
    }

    fn alter_default(
        &self,
        change: &SpecChange,
        table: &str,
        entities: &[Entity],
        warnings: &mut Vec<String>,
    ) -> Step {
        let column = column_of(change);
        let (Some(old), Some(new)) = (
            change.old_value.as_ref().and_then(ChangeValue::as_default),
            change.new_value.as_ref().and_then(ChangeValue::as_default),
        ) else {
            return self.missing_values(change, warnings);
        };
        let field_type = current_field(entities, change)
            .map(|f| f.field_type)
            .unwrap_or_default();

        if !self.dialect.supports_alter_column() {
            return self.unsupported(
                change,
                table,
                format!("change default of {}", column),
                format!("restore default of {}", column),
                warnings,
            );
        }

        let set = |value: &Option<Value>| match value {
            Some(v) => format!(
                "ALTER TABLE {} ALTER COLUMN {} SET DEFAULT {};",
                table,
                column,
                format_literal(v, field_type, self.dialect)
            ),
            None => format!("ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT;", table, column),
        };
        Step::new(set(new), set(old))
    }

    fn alter_unique(&self, change: &SpecChange, table: &str, warnings: &mut Vec<String>) -> Step {
        let column = column_of(change);
        let index = format!("uq_{}_{}", table, column);
        let becomes_unique = change.new_flag() == Some(true);

        let (if_not_exists, if_exists) = if self.dialect.supports_index_if_exists() {
            ("IF NOT EXISTS ", "IF EXISTS ")
        } else {
            ("", "")
        };
        let create = format!(
            "CREATE UNIQUE INDEX {}{} ON {} ({});",
            if_not_exists, index, table, column
        );
        let drop = match self.dialect {
            Dialect::MySQL => format!("DROP INDEX {} ON {};", index, table),
            _ => format!("DROP INDEX {}{};", if_exists, index),
        };

        if becomes_unique {
            warnings.push(format!(
                "Adding a unique index on '{}.{}' fails if duplicate values exist",
                table, column
            ));
            Step::new(create, drop)
        } else {
            warnings.push(format!(
                "Dropping uniqueness of '{}.{}' assumes index {}; a constraint declared inline with the table may have a different name",
                table, column, index
            ));
            Step::new(drop, create)
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// MySQL `MODIFY COLUMN` restating type, nullability and default
    fn modify_column(&self, table: &str, field: &Field) -> String {
        let mut def = format!(
            "{} {}",
            field.column_name(),
            self.types.sql_type(field.field_type)
        );
        if !field.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(value) = &field.default {
            def.push_str(" DEFAULT ");
            def.push_str(&format_literal(value, field.field_type, self.dialect));
        }
        format!("ALTER TABLE {} MODIFY COLUMN {};", table, def)
    }

    fn unsupported(
        &self,
        change: &SpecChange,
        table: &str,
        up: String,
        down: String,
        warnings: &mut Vec<String>,
    ) -> Step {
        tracing::debug!(
            dialect = %self.dialect,
            change = %change.change_type,
            target = %change.target(),
            "in-place alteration unsupported"
        );
        warnings.push(format!(
            "{} cannot alter '{}' in place ({}); rebuild table '{}' manually",
            self.dialect.display_name(),
            change.target(),
            change.change_type,
            table
        ));
        Step::new(
            format!(
                "-- {} does not support ALTER COLUMN: {} on {} requires a table rebuild",
                self.dialect.display_name(),
                up,
                table
            ),
            format!(
                "-- {} does not support ALTER COLUMN: {} on {} requires a table rebuild",
                self.dialect.display_name(),
                down,
                table
            ),
        )
    }

    fn missing_field(&self, change: &SpecChange, table: &str, warnings: &mut Vec<String>) -> Step {
        warnings.push(format!(
            "Field '{}' is missing from the current entities; {} skipped",
            change.target(),
            change.change_type
        ));
        Step::new(
            format!("-- {} on {} skipped: field not found", change.change_type, table),
            format!("-- {} on {} skipped: field not found", change.change_type, table),
        )
    }

    fn missing_values(&self, change: &SpecChange, warnings: &mut Vec<String>) -> Step {
        warnings.push(format!(
            "Change '{}' on '{}' carries no before/after values; skipped",
            change.change_type,
            change.target()
        ));
        Step::new(
            format!("-- {} on {} skipped", change.change_type, change.target()),
            format!("-- {} on {} skipped", change.change_type, change.target()),
        )
    }
}

fn drop_table(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {};", table)
}

fn column_of(change: &SpecChange) -> String {
    column_name(change.field.as_deref().unwrap_or_default())
}

fn current_field<'a>(entities: &'a [Entity], change: &SpecChange) -> Option<&'a Field> {
    let field = change.field.as_deref()?;
    find_entity(entities, &change.entity)?.get_field(field)
}

/// `current` with every attribute change in `changes` to the same field undone
fn previous_field(current: &Field, target: &SpecChange, changes: &[SpecChange]) -> Field {
    let mut field = current.clone();
    let same_field = changes
        .iter()
        .filter(|c| c.entity == target.entity && c.field == target.field);

    for change in same_field {
        match change.change_type {
            ChangeType::FieldTypeChanged => {
                if let Some(ty) = change.old_type() {
                    field.field_type = ty;
                }
            }
            ChangeType::FieldNullableChanged => {
                if let Some(nullable) = change.old_flag() {
                    field.nullable = nullable;
                }
            }
            ChangeType::FieldDefaultChanged => {
                if let Some(default) = change.old_value.as_ref().and_then(ChangeValue::as_default) {
                    field.default = default.clone();
                }
            }
            _ => {}
        }
    }
    field
}

/// Generate SQL for `diff` with the built-in type table for `dialect`.
pub fn generate(diff: &DiffResult, entities: &[Entity], dialect: Dialect) -> MigrationOutput {
    SqlGenerator::new(dialect).generate(diff, entities)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user() -> Entity {
        Entity::new("User")
            .with_field(Field::primary_key())
            .with_field(Field::new("email", FieldType::String).unique())
            .with_field(Field::new("name", FieldType::String).nullable())
    }

    fn user_with(edit: impl FnOnce(&mut Vec<Field>)) -> Entity {
        let mut entity = user();
        edit(&mut entity.fields);
        entity
    }

    fn migrate(old: &[Entity], new: &[Entity], dialect: Dialect) -> MigrationOutput {
        generate(&diff(old, new), new, dialect)
    }

    #[test]
    fn test_create_table_for_new_entity() {
        let out = migrate(&[], &[user()], Dialect::PostgreSQL);
        assert_eq!(
            out.up,
            vec![
                "CREATE TABLE users (id UUID PRIMARY KEY, email VARCHAR(255) NOT NULL UNIQUE, \
                 name VARCHAR(255), created_at TIMESTAMP NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMP NOT NULL DEFAULT NOW());"
                    .to_string()
            ]
        );
        assert_eq!(out.down, vec!["DROP TABLE IF EXISTS users;".to_string()]);
        assert!(!out.has_destructive_changes);
        assert_eq!(out.description, "+ 4 additions, ! 2 breaking changes");
    }

    #[test]
    fn test_create_table_mysql_and_sqlite() {
        let my = migrate(&[], &[user()], Dialect::MySQL);
        assert!(my.up[0].starts_with("CREATE TABLE users (id CHAR(36) PRIMARY KEY,"));
        assert!(my.up[0].contains(
            "updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
        ));

        let lite = migrate(&[], &[user()], Dialect::SQLite);
        assert!(lite.up[0].contains("email TEXT NOT NULL UNIQUE"));
        assert!(lite.up[0].contains("created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP"));
    }

    #[test]
    fn test_create_table_keeps_declared_audit_columns() {
        let entity = user_with(|f| f.push(Field::new("createdAt", FieldType::Timestamp)));
        let sql = SqlGenerator::default().create_table(&entity);
        assert_eq!(sql.matches("created_at").count(), 1);
        assert!(sql.contains("created_at TIMESTAMP NOT NULL,"));
        assert!(sql.contains("updated_at TIMESTAMP NOT NULL DEFAULT NOW()"));
    }

    #[test]
    fn test_column_defaults() {
        let generator = SqlGenerator::new(Dialect::PostgreSQL);
        let active = Field::new("isActive", FieldType::Boolean).with_default(true);
        assert_eq!(
            generator.column_definition(&active),
            "is_active BOOLEAN NOT NULL DEFAULT TRUE"
        );
        let note = Field::new("note", FieldType::Text)
            .nullable()
            .with_default("it's");
        assert_eq!(generator.column_definition(&note), "note TEXT DEFAULT 'it''s'");
    }

    #[test]
    fn test_add_breaking_column_warns() {
        let new = user_with(|f| f.push(Field::new("slug", FieldType::String)));
        let out = migrate(&[user()], &[new], Dialect::PostgreSQL);
        assert_eq!(
            out.up,
            vec!["ALTER TABLE users ADD COLUMN slug VARCHAR(255) NOT NULL;".to_string()]
        );
        assert_eq!(out.down, vec!["ALTER TABLE users DROP COLUMN slug;".to_string()]);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("users.slug"));
    }

    #[test]
    fn test_add_optional_column_has_no_warning() {
        let new = user_with(|f| f.push(Field::new("bio", FieldType::Text).nullable()));
        let out = migrate(&[user()], &[new], Dialect::PostgreSQL);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_drop_column_is_destructive() {
        let new = user_with(|f| f.truncate(2));
        let out = migrate(&[user()], &[new], Dialect::PostgreSQL);
        assert_eq!(out.up, vec!["ALTER TABLE users DROP COLUMN name;".to_string()]);
        assert!(out.down[0].starts_with("-- Cannot restore dropped column users.name"));
        assert!(out.has_destructive_changes);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_drop_table_is_destructive() {
        let out = migrate(&[user()], &[], Dialect::SQLite);
        assert_eq!(out.up, vec!["DROP TABLE IF EXISTS users;".to_string()]);
        assert!(out.down[0].starts_with("-- "));
        assert!(out.has_destructive_changes);
        assert!(out.warnings[0].contains("users"));
    }

    #[test]
    fn test_type_change_per_dialect() {
        let new = user_with(|f| f[2].field_type = FieldType::Text);

        let pg = migrate(&[user()], &[new.clone()], Dialect::PostgreSQL);
        assert_eq!(
            pg.up,
            vec!["ALTER TABLE users ALTER COLUMN name TYPE TEXT;".to_string()]
        );
        assert_eq!(
            pg.down,
            vec!["ALTER TABLE users ALTER COLUMN name TYPE VARCHAR(255);".to_string()]
        );
        assert!(pg.warnings.is_empty());

        let my = migrate(&[user()], &[new.clone()], Dialect::MySQL);
        assert_eq!(
            my.up,
            vec!["ALTER TABLE users MODIFY COLUMN name TEXT;".to_string()]
        );
        assert_eq!(
            my.down,
            vec!["ALTER TABLE users MODIFY COLUMN name VARCHAR(255);".to_string()]
        );

        let lite = migrate(&[user()], &[new], Dialect::SQLite);
        assert!(lite.up[0].starts_with("-- SQLite does not support ALTER COLUMN"));
        assert!(lite.down[0].starts_with("-- "));
        assert_eq!(lite.warnings.len(), 1);
    }

    #[test]
    fn test_breaking_type_change_warns() {
        let new = user_with(|f| f[1].field_type = FieldType::Integer);
        let out = migrate(&[user()], &[new], Dialect::PostgreSQL);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("from string to integer"));
    }

    #[test]
    fn test_nullable_toggle() {
        let tightened = user_with(|f| f[2].nullable = false);
        let pg = migrate(&[user()], &[tightened.clone()], Dialect::PostgreSQL);
        assert_eq!(
            pg.up,
            vec!["ALTER TABLE users ALTER COLUMN name SET NOT NULL;".to_string()]
        );
        assert_eq!(
            pg.down,
            vec!["ALTER TABLE users ALTER COLUMN name DROP NOT NULL;".to_string()]
        );
        assert_eq!(pg.warnings.len(), 1);

        let my = migrate(&[user()], &[tightened], Dialect::MySQL);
        assert_eq!(
            my.up,
            vec!["ALTER TABLE users MODIFY COLUMN name VARCHAR(255) NOT NULL;".to_string()]
        );
        assert_eq!(
            my.down,
            vec!["ALTER TABLE users MODIFY COLUMN name VARCHAR(255);".to_string()]
        );
    }

    fn with_age(age: Field) -> Entity {
        user_with(|f| f.push(age))
    }

    #[test]
    fn test_mysql_down_restores_type_and_nullability() {
        let old = with_age(Field::new("age", FieldType::Integer).nullable());
        let new = with_age(Field::new("age", FieldType::Decimal));

        let out = migrate(&[old], &[new], Dialect::MySQL);
        assert_eq!(
            out.up,
            vec!["ALTER TABLE users MODIFY COLUMN age DECIMAL(10,2) NOT NULL;".to_string()]
        );
        assert_eq!(
            out.down.last().map(String::as_str),
            Some("ALTER TABLE users MODIFY COLUMN age INT;")
        );
        assert!(out.down.iter().all(|s| !s.contains("NOT NULL")));
    }

    #[test]
    fn test_mysql_down_restores_type_and_default() {
        let old = with_age(
            Field::new("age", FieldType::Integer)
                .nullable()
                .with_default(0),
        );
        let new = with_age(
            Field::new("age", FieldType::Decimal)
                .nullable()
                .with_default(1.5),
        );

        let out = migrate(&[old], &[new], Dialect::MySQL);
        assert_eq!(
            out.up,
            vec![
                "ALTER TABLE users MODIFY COLUMN age DECIMAL(10,2) DEFAULT 1.5;".to_string(),
                "ALTER TABLE users ALTER COLUMN age SET DEFAULT 1.5;".to_string(),
            ]
        );
        assert_eq!(
            out.down,
            vec![
                "ALTER TABLE users ALTER COLUMN age SET DEFAULT 0;".to_string(),
                "ALTER TABLE users MODIFY COLUMN age INT DEFAULT 0;".to_string(),
            ]
        );
    }

    #[test]
    fn test_mysql_down_restores_nullability_and_default() {
        let old = with_age(Field::new("age", FieldType::Integer).nullable());
        let new = with_age(Field::new("age", FieldType::Integer).with_default(18));

        let out = migrate(&[old], &[new], Dialect::MySQL);
        assert_eq!(
            out.down.last().map(String::as_str),
            Some("ALTER TABLE users MODIFY COLUMN age INT;")
        );
    }

    #[test]
    fn test_default_toggle() {
        let defaulted = user_with(|f| f[2].default = Some(json!("anon")));
        let pg = migrate(&[user()], &[defaulted.clone()], Dialect::PostgreSQL);
        assert_eq!(
            pg.up,
            vec!["ALTER TABLE users ALTER COLUMN name SET DEFAULT 'anon';".to_string()]
        );
        assert_eq!(
            pg.down,
            vec!["ALTER TABLE users ALTER COLUMN name DROP DEFAULT;".to_string()]
        );
        assert!(pg.warnings.is_empty());

        let lite = migrate(&[user()], &[defaulted], Dialect::SQLite);
        assert!(lite.up[0].starts_with("-- "));
        assert_eq!(lite.warnings.len(), 1);
    }

    #[test]
    fn test_unique_index() {
        let dropped = user_with(|f| f[1].unique = false);

        let pg = migrate(&[user()], &[dropped.clone()], Dialect::PostgreSQL);
        assert_eq!(
            pg.up,
            vec!["DROP INDEX IF EXISTS uq_users_email;".to_string()]
        );
        assert_eq!(
            pg.down,
            vec!["CREATE UNIQUE INDEX IF NOT EXISTS uq_users_email ON users (email);".to_string()]
        );

        let my = migrate(&[dropped], &[user()], Dialect::MySQL);
        assert_eq!(
            my.up,
            vec!["CREATE UNIQUE INDEX uq_users_email ON users (email);".to_string()]
        );
        assert_eq!(my.down, vec!["DROP INDEX uq_users_email ON users;".to_string()]);
    }

    #[test]
    fn test_relations_emit_no_sql() {
        let mut with_rel = user();
        with_rel
            .relations
            .push(archsync_ir::Relation::has_many("posts", "Post"));
        let out = migrate(&[user()], &[with_rel], Dialect::PostgreSQL);
        assert!(out.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_down_is_reverse_order() {
        let new = user_with(|f| {
            f[2].field_type = FieldType::Text;
            f.push(Field::new("bio", FieldType::Text).nullable());
        });
        let out = migrate(&[user()], &[new], Dialect::PostgreSQL);
        assert_eq!(
            out.up,
            vec![
                "ALTER TABLE users ALTER COLUMN name TYPE TEXT;".to_string(),
                "ALTER TABLE users ADD COLUMN bio TEXT;".to_string(),
            ]
        );
        assert_eq!(
            out.down,
            vec![
                "ALTER TABLE users DROP COLUMN bio;".to_string(),
                "ALTER TABLE users ALTER COLUMN name TYPE VARCHAR(255);".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_entity_becomes_comment() {
        let diff = diff(&[], &[user()]);
        let out = generate(&diff, &[], Dialect::PostgreSQL);
        assert!(out.up[0].starts_with("-- CREATE TABLE users skipped"));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_empty_diff() {
        let out = migrate(&[user()], &[user()], Dialect::PostgreSQL);
        assert!(out.is_empty());
        assert_eq!(out.description, "No changes");
        assert!(!out.has_destructive_changes);
    }

    #[test]
    fn test_custom_type_map() {
        let generator = SqlGenerator::new(Dialect::PostgreSQL).with_type_map(
            TypeMap::for_dialect(Dialect::PostgreSQL).with_override(FieldType::String, "CITEXT"),
        );
        let out = generator.generate(&diff(&[], &[user()]), &[user()]);
        assert!(out.up[0].contains("email CITEXT NOT NULL UNIQUE"));
    }
}
