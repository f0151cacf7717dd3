//! Migration file naming, formatting, and atomic writes

use crate::sql::MigrationOutput;
use archsync_core::{Dialect, EngineError, EngineResult};
use chrono::{DateTime, SecondsFormat, Utc};
use heck::ToSnakeCase;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Extension of migration files
pub const MIGRATION_EXTENSION: &str = "sql";

// ============================================================================
// Naming
// ============================================================================

/// Non-cryptographic content fingerprint: xxh3-64 as 16 hex digits
pub fn fingerprint(content: &str) -> String {
    format!("{:016x}", xxh3_64(content.as_bytes()))
}

/// `YYYYMMDDHHMMSS` prefix for a point in time
pub fn timestamp_prefix(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

/// Name used when the caller does not supply one
pub fn generated_name(at: DateTime<Utc>) -> String {
    format!("migration_{}", timestamp_prefix(at))
}

/// snake_case a caller-supplied name; `None` if nothing usable is left
pub fn normalize_name(name: &str) -> Option<String> {
    let normalized = name.trim().to_snake_case();
    (!normalized.is_empty()).then_some(normalized)
}

/// `<timestamp>_<name>.sql`
pub fn file_name(at: DateTime<Utc>, name: &str) -> String {
    format!("{}_{}.{}", timestamp_prefix(at), name, MIGRATION_EXTENSION)
}

/// Split `<digits>_<name>.sql` into its timestamp and logical name
pub fn parse_file_name(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(".sql")?;
    let (prefix, name) = stem.split_once('_')?;
    if prefix.is_empty() || name.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((prefix, name))
}

// ============================================================================
// MigrationFile
// ============================================================================

/// A migration file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Logical name (file name without prefix and extension)
    pub name: String,
    /// `YYYYMMDDHHMMSS` prefix
    pub timestamp: String,
    /// Full path
    pub path: PathBuf,
}

impl MigrationFile {
    /// Recognize a migration file by its name
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_str()?;
        let (timestamp, name) = parse_file_name(file_name)?;
        Some(Self {
            name: name.to_string(),
            timestamp: timestamp.to_string(),
            path,
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}.{}", self.timestamp, self.name, MIGRATION_EXTENSION)
    }

    /// Read the file content
    pub fn read(&self) -> EngineResult<String> {
        std::fs::read_to_string(&self.path).map_err(|e| EngineError::FileRead {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Formatting
// ============================================================================

/// Render the migration file text
pub fn format_migration(
    name: &str,
    output: &MigrationOutput,
    dialect: Dialect,
    generated_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("-- Migration: {}", name),
        format!("-- Description: {}", output.description),
        format!(
            "-- Generated: {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        ),
        format!("-- Dialect: {}", dialect.id()),
        "--".to_string(),
    ];

    if !output.warnings.is_empty() {
        lines.push("-- WARNINGS:".to_string());
        lines.extend(output.warnings.iter().map(|w| format!("--   ! {}", w)));
        lines.push("--".to_string());
    }

    lines.push("-- Up".to_string());
    push_statements(&mut lines, &output.up);
    lines.push(String::new());
    lines.push("-- Down".to_string());
    push_statements(&mut lines, &output.down);

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_statements(lines: &mut Vec<String>, statements: &[String]) {
    if statements.is_empty() {
        lines.push("-- No changes".to_string());
    } else {
        lines.extend(statements.iter().cloned());
    }
}

// ============================================================================
// Atomic writes
// ============================================================================

/// Write `content` to a sibling temp file, then rename it over `path`
pub fn write_atomic(path: &Path, content: &str) -> EngineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| EngineError::FileWrite {
            path: path.to_path_buf(),
            message: "path has no file name".to_string(),
        })?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let write_err = |e: std::io::Error| EngineError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    std::fs::write(&temp_path, content).map_err(write_err)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint("CREATE TABLE users (id UUID);");
        assert_eq!(a.len(), 16);
        assert!(a.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(a, fingerprint("CREATE TABLE users (id UUID);"));
        assert_ne!(a, fingerprint("CREATE TABLE users (id TEXT);"));
    }

    #[test]
    fn test_names() {
        assert_eq!(timestamp_prefix(at()), "20240309140507");
        assert_eq!(generated_name(at()), "migration_20240309140507");
        assert_eq!(file_name(at(), "add_users"), "20240309140507_add_users.sql");
        assert_eq!(normalize_name("Add Users").as_deref(), Some("add_users"));
        assert_eq!(normalize_name("addUserEmail").as_deref(), Some("add_user_email"));
        assert_eq!(normalize_name("  "), None);
    }

    #[test]
    fn test_parse_file_name() {
        assert_eq!(
            parse_file_name("20240309140507_add_users.sql"),
            Some(("20240309140507", "add_users"))
        );
        assert_eq!(parse_file_name("20240309140507_add_users.txt"), None);
        assert_eq!(parse_file_name("notes_add_users.sql"), None);
        assert_eq!(parse_file_name("20240309140507.sql"), None);
        assert_eq!(parse_file_name("_x.sql"), None);
    }

    #[test]
    fn test_format_with_warnings() {
        let output = MigrationOutput {
            up: vec!["ALTER TABLE users DROP COLUMN name;".to_string()],
            down: vec!["-- Cannot restore dropped column users.name".to_string()],
            description: "- 1 removal, ! 1 breaking change".to_string(),
            has_destructive_changes: true,
            warnings: vec!["Dropping column 'users.name' permanently destroys its data".to_string()],
        };
        let text = format_migration("drop_name", &output, Dialect::PostgreSQL, at());
        assert_eq!(
            text,
            "-- Migration: drop_name\n\
             -- Description: - 1 removal, ! 1 breaking change\n\
             -- Generated: 2024-03-09T14:05:07Z\n\
             -- Dialect: postgresql\n\
             --\n\
             -- WARNINGS:\n\
             --   ! Dropping column 'users.name' permanently destroys its data\n\
             --\n\
             -- Up\n\
             ALTER TABLE users DROP COLUMN name;\n\
             \n\
             -- Down\n\
             -- Cannot restore dropped column users.name\n"
        );
    }

    #[test]
    fn test_format_empty_sections() {
        let output = MigrationOutput {
            description: "No changes".to_string(),
            ..Default::default()
        };
        let text = format_migration("noop", &output, Dialect::SQLite, at());
        assert!(!text.contains("WARNINGS"));
        assert_eq!(text.matches("-- No changes").count(), 2);
    }

    #[test]
    fn test_migration_file_from_path() {
        let file = MigrationFile::from_path("/tmp/m/20240309140507_add_users.sql").unwrap();
        assert_eq!(file.name, "add_users");
        assert_eq!(file.timestamp, "20240309140507");
        assert_eq!(file.file_name(), "20240309140507_add_users.sql");
        assert!(MigrationFile::from_path("/tmp/m/README.md").is_none());
    }

    #[test]
    fn test_write_atomic_creates_parent_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
