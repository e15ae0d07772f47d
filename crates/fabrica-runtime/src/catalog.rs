//! Explicit entry-point table and the on-disk unit manifest.
//!
//! There is no reflection anywhere in discovery: a plugin unit's manifest
//! names a catalog entry, and the entry is a plain function returning the
//! unit's registrars. Host code (or statically linked plugin crates)
//! populates the catalog before the first scan.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fabrica_contract::Registrar;

use crate::error::RuntimeError;

/// File name of the unit manifest inside a plugin directory.
pub const UNIT_MANIFEST_FILE: &str = "plugin.json";

/// Registration entry point of one plugin unit.
pub type UnitEntryFn = fn() -> Vec<Box<dyn Registrar>>;

/// Table mapping entry-point names to registration functions.
#[derive(Debug, Default)]
pub struct UnitCatalog {
    entries: HashMap<String, UnitEntryFn>,
}

impl UnitCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry point under a name, replacing any previous entry
    /// with the same name. Returns the replaced entry, if any.
    pub fn register(&mut self, name: impl Into<String>, entry: UnitEntryFn) -> Option<UnitEntryFn> {
        self.entries.insert(name.into(), entry)
    }

    /// Looks up an entry point by name.
    pub fn get(&self, name: &str) -> Option<UnitEntryFn> {
        self.entries.get(name).copied()
    }

    /// Returns the registered entry names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|s| s.as_str())
    }

    /// Returns the number of registered entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk manifest of a plugin unit (`plugin.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitManifest {
    /// Display name of the unit.
    pub name: String,
    /// Catalog entry point that registers this unit's modules.
    pub entry: String,
    /// Unit version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UnitManifest {
    /// Loads the manifest from a unit directory.
    pub fn load(unit_dir: &Path) -> Result<Self, RuntimeError> {
        let path = unit_dir.join(UNIT_MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            RuntimeError::ManifestRead {
                path: path.clone(),
                source,
            }
        })?;
        serde_json::from_str(&content)
            .map_err(|source| RuntimeError::ManifestParse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrica_contract::{Module, RegisterError};

    struct StubRegistrar;

    impl Registrar for StubRegistrar {
        fn name(&self) -> &'static str {
            "StubRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Err(RegisterError::new("stub"))
        }
    }

    fn stub_entry() -> Vec<Box<dyn Registrar>> {
        vec![Box::new(StubRegistrar)]
    }

    #[test]
    fn test_catalog_register_and_lookup() {
        let mut catalog = UnitCatalog::new();
        assert!(catalog.is_empty());

        assert!(catalog.register("stub", stub_entry).is_none());
        assert_eq!(catalog.len(), 1);

        let entry = catalog.get("stub").unwrap();
        assert_eq!(entry()[0].name(), "StubRegistrar");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_catalog_replacement_returns_previous() {
        let mut catalog = UnitCatalog::new();
        catalog.register("stub", stub_entry);
        assert!(catalog.register("stub", stub_entry).is_some());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_manifest_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(UNIT_MANIFEST_FILE),
            r#"{"name": "User Demo", "entry": "user_demo", "version": "1.0.0"}"#,
        )
        .unwrap();

        let manifest = UnitManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.name, "User Demo");
        assert_eq!(manifest.entry, "user_demo");
        assert_eq!(manifest.version.as_deref(), Some("1.0.0"));
        assert_eq!(manifest.description, None);
    }

    #[test]
    fn test_manifest_load_failures() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            UnitManifest::load(dir.path()),
            Err(RuntimeError::ManifestRead { .. })
        ));

        std::fs::write(dir.path().join(UNIT_MANIFEST_FILE), "not json").unwrap();
        assert!(matches!(
            UnitManifest::load(dir.path()),
            Err(RuntimeError::ManifestParse { .. })
        ));
    }
}
