//! Loaded plugin unit records.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::catalog::UnitManifest;

/// One physically loaded plugin unit.
///
/// Created lazily on the first module a unit's registrars contribute during
/// a scan; never hot-reloaded. A rescan replaces the record wholesale.
#[derive(Debug, Clone)]
pub struct PluginUnit {
    /// Stable id, derived from the unit's directory name.
    pub id: String,
    /// Display name from the manifest.
    pub name: String,
    /// Filesystem path of the unit directory.
    pub path: PathBuf,
    /// Catalog entry point the unit registered through.
    pub entry: String,
    /// Ids of the modules this unit produced, in registration order.
    pub module_ids: Vec<String>,
    /// When the unit was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl PluginUnit {
    /// Creates a unit record from its directory and manifest.
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, manifest: &UnitManifest) -> Self {
        Self {
            id: id.into(),
            name: manifest.name.clone(),
            path: path.into(),
            entry: manifest.entry.clone(),
            module_ids: Vec::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Returns true if this unit produced the given module.
    pub fn owns_module(&self, module_id: &str) -> bool {
        self.module_ids.iter().any(|id| id == module_id)
    }
}
