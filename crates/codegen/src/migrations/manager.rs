//! Migration lifecycle over the persisted state
//!
//! ```text
//! Uninitialized ──baseline()──▶ Baselined ──generate_migration()──▶ preview
//!                                   ▲                                 │
//!                                   └────────── save_migration() ◀────┘
//! ```
//!
//! Only `baseline()` and `save_migration()` move the last-seen snapshot;
//! `record_applied()` appends history. Everything else is read-only.

use super::file::{
    MigrationFile, file_name, fingerprint, format_migration, generated_name, normalize_name,
    write_atomic,
};
use super::state::{BASELINE_NAME, Direction, MigrationRecord, MigrationState, StateLoad, StateStore};
use crate::config::SyncConfig;
use crate::diff::{DiffResult, Differ};
use crate::sql::{MigrationOutput, SqlGenerator};
use archsync_core::{Dialect, EngineError, EngineResult, ResultExt};
use archsync_ir::Entity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// ============================================================================
// Results
// ============================================================================

/// A migration computed but not yet written
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMigration {
    /// Logical name
    pub name: String,
    /// `<timestamp>_<name>.sql`
    pub file_name: String,
    pub generated_at: DateTime<Utc>,
    pub dialect: Dialect,
    pub diff: DiffResult,
    pub output: MigrationOutput,
    /// Full file text
    pub content: String,
}

/// Read-only summary of the migration state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStatus {
    pub has_baseline: bool,
    /// Entities in the last snapshot
    pub entity_count: usize,
    /// `up` history entries
    pub applied_count: usize,
    /// Migration files without an `up` record
    pub pending_count: usize,
    /// Most recent history entry
    pub last_migration: Option<MigrationRecord>,
    /// Applied migrations whose file no longer matches the recorded hash
    pub drifted: Vec<String>,
}

// ============================================================================
// MigrationManager
// ============================================================================

/// Drives the differ and SQL generator against the persisted state
#[derive(Debug, Clone)]
pub struct MigrationManager {
    root: PathBuf,
    config: SyncConfig,
    store: StateStore,
    differ: Differ,
    generator: SqlGenerator,
}

impl MigrationManager {
    /// Manager for the project at `root`
    pub fn new(root: impl Into<PathBuf>, config: SyncConfig) -> Self {
        let root = root.into();
        let store = StateStore::new(config.state_path(&root));
        let differ = Differ::new(config.compatibility());
        let generator = SqlGenerator::new(config.dialect);
        Self {
            root,
            config,
            store,
            differ,
            generator,
        }
    }

    /// Manager configured from `<root>/archsync.toml`
    pub fn open(root: impl Into<PathBuf>) -> EngineResult<Self> {
        let root = root.into();
        let config = SyncConfig::load_from_root(&root)?;
        Ok(Self::new(root, config))
    }

    /// Replace the SQL generator
    pub fn with_generator(mut self, generator: SqlGenerator) -> Self {
        self.generator = generator;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.generator.dialect()
    }

    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path(&self.root)
    }

    pub fn state_path(&self) -> &Path {
        self.store.path()
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Read the state file, distinguishing absent from corrupt
    pub fn load_state(&self) -> EngineResult<StateLoad> {
        self.store.load()
    }

    /// The current state; fails on a corrupt state file
    pub fn state(&self) -> EngineResult<MigrationState> {
        self.store.load()?.into_state()
    }

    /// Record `entities` as the known schema without generating SQL
    pub fn baseline(&self, entities: &[Entity]) -> EngineResult<MigrationRecord> {
        let mut state = self.state()?;
        let snapshot =
            serde_json::to_string(entities).with_context("Fingerprinting baseline snapshot")?;
        let record = MigrationRecord::new(
            BASELINE_NAME,
            fingerprint(&snapshot),
            Direction::Up,
            Utc::now(),
        );

        state.last_snapshot = entities.to_vec();
        state.history.push(record.clone());
        self.store.save(&state)?;

        tracing::info!(entities = entities.len(), "recorded baseline");
        Ok(record)
    }

    /// Move the state file aside and start over with an empty state
    pub fn reset_state(&self) -> EngineResult<Option<PathBuf>> {
        let moved = self.store.quarantine()?;
        self.store.save(&MigrationState::new())?;
        tracing::info!(path = %self.store.path().display(), "reset migration state");
        Ok(moved)
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Diff `entities` against the last snapshot; `None` when nothing changed
    pub fn generate_migration(
        &self,
        entities: &[Entity],
        name: Option<&str>,
    ) -> EngineResult<Option<GeneratedMigration>> {
        self.generate_migration_at(entities, name, Utc::now())
    }

    /// [`generate_migration`](Self::generate_migration) with a fixed clock
    pub fn generate_migration_at(
        &self,
        entities: &[Entity],
        name: Option<&str>,
        at: DateTime<Utc>,
    ) -> EngineResult<Option<GeneratedMigration>> {
        let state = self.state()?;
        let diff = self.differ.diff(&state.last_snapshot, entities);
        if diff.is_empty() {
            tracing::debug!("no changes since last snapshot");
            return Ok(None);
        }

        let name = name
            .and_then(normalize_name)
            .unwrap_or_else(|| generated_name(at));
        let output = self.generator.generate(&diff, entities);
        let content = format_migration(&name, &output, self.dialect(), at);

        Ok(Some(GeneratedMigration {
            file_name: file_name(at, &name),
            name,
            generated_at: at,
            dialect: self.dialect(),
            diff,
            output,
            content,
        }))
    }

    /// Write the migration file and advance the snapshot to `entities`
    pub fn save_migration(
        &self,
        migration: &GeneratedMigration,
        entities: &[Entity],
    ) -> EngineResult<PathBuf> {
        let mut state = self.state()?;

        let path = self.migrations_dir().join(&migration.file_name);
        write_atomic(&path, &migration.content)?;

        state.last_snapshot = entities.to_vec();
        self.store.save(&state)?;

        tracing::info!(
            name = %migration.name,
            path = %path.display(),
            changes = migration.diff.len(),
            "saved migration"
        );
        Ok(path)
    }

    /// Append a history entry fingerprinting `content`
    pub fn record_applied(
        &self,
        name: &str,
        direction: Direction,
        content: &str,
    ) -> EngineResult<MigrationRecord> {
        let mut state = self.state()?;
        let record = MigrationRecord::new(name, fingerprint(content), direction, Utc::now());
        state.history.push(record.clone());
        self.store.save(&state)?;

        tracing::info!(name, direction = %direction, hash = %record.hash, "recorded migration");
        Ok(record)
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Migration files on disk, oldest first
    pub fn migration_files(&self) -> EngineResult<Vec<MigrationFile>> {
        let dir = self.migrations_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| EngineError::FileRead {
                path: dir.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(file) = MigrationFile::from_path(entry.path()) {
                files.push(file);
            }
        }
        files.sort_by_key(|f| f.file_name());
        Ok(files)
    }

    /// The file for a logical migration name
    pub fn find_migration(&self, name: &str) -> EngineResult<MigrationFile> {
        self.migration_files()?
            .into_iter()
            .rev()
            .find(|f| f.name == name)
            .ok_or_else(|| EngineError::MigrationNotFound(name.to_string()))
    }

    /// Names of migration files with no `up` record
    pub fn pending_migrations(&self) -> EngineResult<Vec<String>> {
        let state = self.state()?;
        let applied = state.applied_names();
        Ok(self
            .migration_files()?
            .into_iter()
            .filter(|f| !applied.contains(f.name.as_str()))
            .map(|f| f.name)
            .collect())
    }

    // ========================================================================
    // Reporting
    // ========================================================================

    /// Applied migrations whose file content changed since it was recorded
    pub fn check_drift(&self) -> EngineResult<Vec<String>> {
        let state = self.state()?;
        self.drifted(&state)
    }

    fn drifted(&self, state: &MigrationState) -> EngineResult<Vec<String>> {
        let mut drifted = Vec::new();
        for file in self.migration_files()? {
            let Some(record) = state.last_applied(&file.name) else {
                continue;
            };
            if fingerprint(&file.read()?) != record.hash {
                tracing::warn!(name = %file.name, "migration file changed after it was applied");
                drifted.push(file.name);
            }
        }
        Ok(drifted)
    }

    /// Summary of baseline, history, and pending files
    pub fn status(&self) -> EngineResult<MigrationStatus> {
        let state = self.state()?;
        let applied = state.applied_names();
        let pending_count = self
            .migration_files()?
            .iter()
            .filter(|f| !applied.contains(f.name.as_str()))
            .count();

        Ok(MigrationStatus {
            has_baseline: state.has_baseline(),
            entity_count: state.last_snapshot.len(),
            applied_count: state.applied_count(),
            pending_count,
            last_migration: state.last_record().cloned(),
            drifted: self.drifted(&state)?,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use archsync_core::FieldType;
    use archsync_ir::Field;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn user() -> Entity {
        Entity::new("User")
            .with_field(Field::primary_key())
            .with_field(Field::new("email", FieldType::String).unique())
            .with_field(Field::new("name", FieldType::String).nullable())
    }

    fn user_with_bio() -> Entity {
        user().with_field(Field::new("bio", FieldType::Text).nullable())
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, second).unwrap()
    }

    fn manager(dir: &TempDir) -> MigrationManager {
        MigrationManager::new(dir.path(), SyncConfig::default())
    }

    #[test]
    fn test_uninitialized_state() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        assert_eq!(manager.load_state().unwrap(), StateLoad::Absent);
        let status = manager.status().unwrap();
        assert!(!status.has_baseline);
        assert_eq!(status.pending_count, 0);
        assert!(status.last_migration.is_none());
        assert!(!manager.state_path().exists());
    }

    #[test]
    fn test_baseline() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let record = manager.baseline(&[user()]).unwrap();
        assert_eq!(record.name, "baseline");
        assert_eq!(record.direction, Direction::Up);

        let state = manager.state().unwrap();
        assert_eq!(state.last_snapshot, vec![user()]);
        assert_eq!(state.history.len(), 1);

        let status = manager.status().unwrap();
        assert!(status.has_baseline);
        assert_eq!(status.entity_count, 1);
        assert_eq!(status.applied_count, 1);
    }

    #[test]
    fn test_generate_is_noop_without_changes() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        manager.baseline(&[user()]).unwrap();
        let before = manager.state().unwrap();

        assert!(manager.generate_migration(&[user()], None).unwrap().is_none());
        assert_eq!(manager.state().unwrap(), before);
        assert!(!manager.migrations_dir().exists());
    }

    #[test]
    fn test_generate_does_not_mutate_state() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        manager.baseline(&[user()]).unwrap();
        let before = manager.state().unwrap();

        let migration = manager
            .generate_migration_at(&[user_with_bio()], Some("Add Bio"), at(7))
            .unwrap()
            .unwrap();
        assert_eq!(migration.name, "add_bio");
        assert_eq!(migration.file_name, "20240309140507_add_bio.sql");
        assert_eq!(
            migration.output.up,
            vec!["ALTER TABLE users ADD COLUMN bio TEXT;".to_string()]
        );
        assert!(migration.content.starts_with("-- Migration: add_bio\n"));

        assert_eq!(manager.state().unwrap(), before);
        assert!(manager.migration_files().unwrap().is_empty());
    }

    #[test]
    fn test_generated_name_when_none_given() {
        let dir = TempDir::new().unwrap();
        let migration = manager(&dir)
            .generate_migration_at(&[user()], None, at(7))
            .unwrap()
            .unwrap();
        assert_eq!(migration.name, "migration_20240309140507");
        assert_eq!(migration.file_name, "20240309140507_migration_20240309140507.sql");
    }

    #[test]
    fn test_save_advances_snapshot() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let migration = manager
            .generate_migration_at(&[user()], Some("create_users"), at(1))
            .unwrap()
            .unwrap();
        let path = manager.save_migration(&migration, &[user()]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), migration.content);
        assert_eq!(manager.state().unwrap().last_snapshot, vec![user()]);
        assert!(manager.state().unwrap().history.is_empty());
        assert!(manager.generate_migration(&[user()], None).unwrap().is_none());
    }

    #[test]
    fn test_pending_and_record_applied() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);

        let first = manager
            .generate_migration_at(&[user()], Some("create_users"), at(1))
            .unwrap()
            .unwrap();
        manager.save_migration(&first, &[user()]).unwrap();
        let second = manager
            .generate_migration_at(&[user_with_bio()], Some("add_bio"), at(2))
            .unwrap()
            .unwrap();
        manager.save_migration(&second, &[user_with_bio()]).unwrap();

        assert_eq!(
            manager.pending_migrations().unwrap(),
            vec!["create_users".to_string(), "add_bio".to_string()]
        );

        manager
            .record_applied("create_users", Direction::Up, &first.content)
            .unwrap();
        assert_eq!(
            manager.pending_migrations().unwrap(),
            vec!["add_bio".to_string()]
        );

        let status = manager.status().unwrap();
        assert_eq!(status.applied_count, 1);
        assert_eq!(status.pending_count, 1);
        assert_eq!(status.last_migration.unwrap().name, "create_users");
        assert!(status.drifted.is_empty());
    }

    #[test]
    fn test_down_record_does_not_count_as_applied() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        let migration = manager
            .generate_migration_at(&[user()], Some("create_users"), at(1))
            .unwrap()
            .unwrap();
        manager.save_migration(&migration, &[user()]).unwrap();
        manager
            .record_applied("create_users", Direction::Down, &migration.content)
            .unwrap();

        assert_eq!(manager.pending_migrations().unwrap().len(), 1);
    }

    #[test]
    fn test_pending_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        let migrations = manager.migrations_dir();
        std::fs::create_dir_all(migrations.join("archive")).unwrap();
        std::fs::write(migrations.join("README.md"), "notes").unwrap();
        std::fs::write(migrations.join("draft_users.sql"), "--").unwrap();
        std::fs::write(migrations.join("20240101000000_seed.sql"), "--").unwrap();

        assert_eq!(manager.pending_migrations().unwrap(), vec!["seed".to_string()]);
    }

    #[test]
    fn test_drift_detection() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        let migration = manager
            .generate_migration_at(&[user()], Some("create_users"), at(1))
            .unwrap()
            .unwrap();
        let path = manager.save_migration(&migration, &[user()]).unwrap();
        manager
            .record_applied("create_users", Direction::Up, &migration.content)
            .unwrap();
        assert!(manager.check_drift().unwrap().is_empty());

        std::fs::write(&path, format!("{}-- edited\n", migration.content)).unwrap();
        assert_eq!(
            manager.check_drift().unwrap(),
            vec!["create_users".to_string()]
        );
        assert_eq!(manager.status().unwrap().drifted.len(), 1);
    }

    #[test]
    fn test_corrupt_state_blocks_operations_until_reset() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        std::fs::create_dir_all(manager.state_path().parent().unwrap()).unwrap();
        std::fs::write(manager.state_path(), "{{{").unwrap();

        assert!(manager.load_state().unwrap().is_corrupt());
        assert!(manager.generate_migration(&[user()], None).unwrap_err().is_state());
        assert!(manager.baseline(&[user()]).unwrap_err().is_state());
        assert!(manager.status().unwrap_err().is_state());
        assert_eq!(std::fs::read_to_string(manager.state_path()).unwrap(), "{{{");

        let moved = manager.reset_state().unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(moved).unwrap(), "{{{");
        assert_eq!(manager.state().unwrap(), MigrationState::new());
        assert!(manager.generate_migration(&[user()], None).unwrap().is_some());
    }

    #[test]
    fn test_find_migration() {
        let dir = TempDir::new().unwrap();
        let manager = manager(&dir);
        let migration = manager
            .generate_migration_at(&[user()], Some("create_users"), at(1))
            .unwrap()
            .unwrap();
        manager.save_migration(&migration, &[user()]).unwrap();

        let found = manager.find_migration("create_users").unwrap();
        assert_eq!(found.read().unwrap(), migration.content);
        assert!(matches!(
            manager.find_migration("nope").unwrap_err(),
            EngineError::MigrationNotFound(_)
        ));
    }

    #[test]
    fn test_config_dialect_and_whitelist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(crate::config::CONFIG_FILE_NAME),
            "dialect = \"mysql\"\n\n[[safe_type_changes]]\nfrom = \"date\"\nto = \"timestamp\"\n",
        )
        .unwrap();
        let manager = MigrationManager::open(dir.path()).unwrap();
        assert_eq!(manager.dialect(), Dialect::MySQL);

        let born = |ty| Entity::new("User").with_field(Field::new("bornOn", ty).nullable());
        manager.baseline(&[born(FieldType::Date)]).unwrap();
        let migration = manager
            .generate_migration(&[born(FieldType::Timestamp)], None)
            .unwrap()
            .unwrap();

        assert!(!migration.diff.has_breaking_changes);
        assert!(migration.content.contains("-- Dialect: mysql"));
        assert_eq!(
            migration.output.up,
            vec!["ALTER TABLE users MODIFY COLUMN born_on DATETIME;".to_string()]
        );
    }
}
