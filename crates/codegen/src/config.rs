//! Project configuration (`archsync.toml`)
//!
//! ```toml
//! dialect = "mysql"
//! migrations_dir = "db/migrations"
//! state_file = ".archsync/migration-state.json"
//!
//! [[safe_type_changes]]
//! from = "date"
//! to = "timestamp"
//! ```
//!
//! Every key is optional. Relative paths resolve against the project root.

use crate::diff::TypeCompatibility;
use archsync_core::{Dialect, EngineError, EngineResult, FieldType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up at the project root
pub const CONFIG_FILE_NAME: &str = "archsync.toml";

// ============================================================================
// SyncConfig
// ============================================================================

/// Configuration for the migration engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Target SQL dialect
    pub dialect: Dialect,

    /// Directory migration files are written to
    pub migrations_dir: PathBuf,

    /// Location of the persisted migration state
    pub state_file: PathBuf,

    /// Type changes treated as safe on top of the built-in whitelist
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub safe_type_changes: Vec<TypeChangeRule>,
}

/// A single `from → to` widening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeChangeRule {
    pub from: FieldType,
    pub to: FieldType,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            migrations_dir: PathBuf::from("migrations"),
            state_file: PathBuf::from(".archsync/migration-state.json"),
            safe_type_changes: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&content)
            .map_err(|e| EngineError::config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), dialect = %config.dialect, "loaded config");
        Ok(config)
    }

    /// Load `archsync.toml` from `root`, or defaults when there is none
    pub fn load_from_root(root: impl AsRef<Path>) -> EngineResult<Self> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> EngineResult<Self> {
        toml::from_str(content).map_err(|e| EngineError::config(e.to_string()))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> EngineResult<String> {
        toml::to_string_pretty(self).map_err(|e| EngineError::config(e.to_string()))
    }

    /// Set the dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the migrations directory
    pub fn with_migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the state file location
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = path.into();
        self
    }

    /// Treat `from → to` as a safe type change
    pub fn with_safe_type_change(mut self, from: FieldType, to: FieldType) -> Self {
        self.safe_type_changes.push(TypeChangeRule { from, to });
        self
    }

    /// Built-in whitelist plus the configured widenings
    pub fn compatibility(&self) -> TypeCompatibility {
        let mut compat = TypeCompatibility::default();
        compat.extend(self.safe_type_changes.iter().map(|r| (r.from, r.to)));
        compat
    }

    /// Migrations directory resolved against `root`
    pub fn migrations_path(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// State file resolved against `root`
    pub fn state_path(&self, root: &Path) -> PathBuf {
        root.join(&self.state_file)
    }
}

// ============================================================================
// Tests
// ============================================================================
