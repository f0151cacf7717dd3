//! Loading and saving entity spec files
//!
//! Entity lists are exchanged as JSON, either a bare array of entities or an
//! object with an `entities` key. The engine performs no schema validation of
//! its own; whatever parses is passed through as-is.

use crate::Entity;
use archsync_core::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Spec File Wrapper
// ============================================================================

/// Wrapper form of an entity spec file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySpecFile {
    /// The entity definitions
    pub entities: Vec<Entity>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SpecShape {
    Wrapped(EntitySpecFile),
    Bare(Vec<Entity>),
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load an entity list from a JSON spec file
pub fn load_entities(path: impl AsRef<Path>) -> EngineResult<Vec<Entity>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EngineError::SpecNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| EngineError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let entities = entities_from_str(&json)
        .map_err(|e| EngineError::invalid_spec(path, e.to_string()))?;

    tracing::debug!(path = %path.display(), entities = entities.len(), "loaded entity spec");
    Ok(entities)
}

/// Parse an entity list from a JSON string (bare array or `{ "entities": [...] }`)
pub fn entities_from_str(json: &str) -> EngineResult<Vec<Entity>> {
    let shape: SpecShape = serde_json::from_str(json)?;
    Ok(match shape {
        SpecShape::Wrapped(file) => file.entities,
        SpecShape::Bare(entities) => entities,
    })
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save an entity list to a JSON spec file (wrapped form)
pub fn save_entities(entities: &[Entity], path: impl AsRef<Path>) -> EngineResult<()> {
    let path = path.as_ref();
    let file = EntitySpecFile {
        entities: entities.to_vec(),
    };

    let json = serde_json::to_string_pretty(&file).map_err(|e| EngineError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize entities: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| EngineError::DirectoryCreate {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| EngineError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
