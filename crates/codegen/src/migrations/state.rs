//! Persisted migration state
//!
//! The state file is the single durable record of the last schema the engine
//! has seen and of every migration recorded against it:
//!
//! ```json
//! {
//!   "version": 1,
//!   "lastSnapshot": [ { "name": "User", "fields": [ ... ] } ],
//!   "history": [
//!     { "name": "baseline", "appliedAt": "2024-03-09T14:05:07Z", "hash": "…", "direction": "up" }
//!   ]
//! }
//! ```

use super::file::write_atomic;
use archsync_core::{EngineError, EngineResult};
use archsync_ir::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Current state file format version
pub const STATE_VERSION: u32 = 1;

/// History name used by `baseline()`
pub const BASELINE_NAME: &str = "baseline";

// ============================================================================
// Direction
// ============================================================================

/// Direction a migration was applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(EngineError::with_context(
                "Invalid direction",
                format!("'{}' (expected up or down)", other),
            )),
        }
    }
}

// ============================================================================
// MigrationRecord
// ============================================================================

/// One append-only history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    pub name: String,
    pub applied_at: DateTime<Utc>,
    /// Content fingerprint at the time of recording
    pub hash: String,
    pub direction: Direction,
}

impl MigrationRecord {
    pub fn new(
        name: impl Into<String>,
        hash: impl Into<String>,
        direction: Direction,
        applied_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            applied_at,
            hash: hash.into(),
            direction,
        }
    }
}

// ============================================================================
// MigrationState
// ============================================================================

/// Last seen schema plus migration history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationState {
    pub version: u32,
    #[serde(default)]
    pub last_snapshot: Vec<Entity>,
    #[serde(default)]
    pub history: Vec<MigrationRecord>,
}

impl Default for MigrationState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_snapshot: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl MigrationState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot exists or a baseline was recorded
    pub fn has_baseline(&self) -> bool {
        !self.last_snapshot.is_empty() || self.history.iter().any(|r| r.name == BASELINE_NAME)
    }

    /// Names with at least one `up` record
    pub fn applied_names(&self) -> HashSet<&str> {
        self.history
            .iter()
            .filter(|r| r.direction == Direction::Up)
            .map(|r| r.name.as_str())
            .collect()
    }

    /// Number of `up` records
    pub fn applied_count(&self) -> usize {
        self.history
            .iter()
            .filter(|r| r.direction == Direction::Up)
            .count()
    }

    /// Most recent history entry
    pub fn last_record(&self) -> Option<&MigrationRecord> {
        self.history.last()
    }

    /// Most recent `up` record for `name`
    pub fn last_applied(&self, name: &str) -> Option<&MigrationRecord> {
        self.history
            .iter()
            .rev()
            .find(|r| r.name == name && r.direction == Direction::Up)
    }
}

// ============================================================================
// StateStore
// ============================================================================

/// Outcome of reading the state file
#[derive(Debug, Clone, PartialEq)]
pub enum StateLoad {
    /// State file parsed
    Loaded(MigrationState),
    /// No state file yet
    Absent,
    /// State file exists but cannot be parsed
    Corrupt { path: PathBuf, reason: String },
}

impl StateLoad {
    /// The loaded state, an empty one when absent, or `StateCorrupt`
    pub fn into_state(self) -> EngineResult<MigrationState> {
        match self {
            StateLoad::Loaded(state) => Ok(state),
            StateLoad::Absent => Ok(MigrationState::new()),
            StateLoad::Corrupt { path, reason } => Err(EngineError::state_corrupt(path, reason)),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StateLoad::Corrupt { .. })
    }
}

/// Reads and writes the state file
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file without modifying anything on disk
    pub fn load(&self) -> EngineResult<StateLoad> {
        if !self.path.exists() {
            return Ok(StateLoad::Absent);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| EngineError::FileRead {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let state: MigrationState = match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "migration state is corrupt");
                return Ok(StateLoad::Corrupt {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        if state.version != STATE_VERSION {
            return Err(EngineError::StateVersionMismatch {
                expected: STATE_VERSION,
                found: state.version,
            });
        }

        Ok(StateLoad::Loaded(state))
    }

    /// Overwrite the state file atomically
    pub fn save(&self, state: &MigrationState) -> EngineResult<()> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!(
            path = %self.path.display(),
            entities = state.last_snapshot.len(),
            history = state.history.len(),
            "saved migration state"
        );
        Ok(())
    }

    /// Move the current state file to `<state>.corrupt`
    pub fn quarantine(&self) -> EngineResult<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut target = self.path.clone().into_os_string();
        target.push(".corrupt");
        let target = PathBuf::from(target);

        std::fs::rename(&self.path, &target).map_err(|e| EngineError::FileWrite {
            path: target.clone(),
            message: e.to_string(),
        })?;
        tracing::warn!(from = %self.path.display(), to = %target.display(), "moved state file aside");
        Ok(Some(target))
    }
}

// ============================================================================
// Tests
// ============================================================================
