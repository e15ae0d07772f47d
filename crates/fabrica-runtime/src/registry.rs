//! Plugin registry: discovery, lookup, and the execution front door.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use fabrica_contract::{
    validate_module, ErrorCode, ExecutionContext, JsonMap, Module, ModuleDescriptor, Outcome,
};

use crate::catalog::{UnitCatalog, UnitManifest, UNIT_MANIFEST_FILE};
use crate::error::RuntimeError;
use crate::isolator::{Isolator, IsolatorConfig};
use crate::unit::PluginUnit;

/// How a handler is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// In-process, no isolation. Appropriate only for trusted handlers when
    /// the caller already wraps calls in its own failure boundary; panics
    /// propagate.
    Direct,
    /// Inside a bounded child process. The default path for untrusted code.
    Isolated,
}

/// The plugin registry.
///
/// Owns all discovery state explicitly; there are no globals. Reads take
/// `&self` and discovery takes `&mut self`, so the borrow checker provides
/// the single mutual-exclusion boundary rescans need. Callers sharing a
/// registry across threads wrap it in an `RwLock`.
pub struct Registry {
    catalog: UnitCatalog,
    isolator: Isolator,
    units: Vec<PluginUnit>,
    modules: HashMap<String, Module>,
    /// Module ids in first-registration order.
    order: Vec<String>,
}

impl Registry {
    /// Creates a registry over the given entry-point catalog with default
    /// isolation settings.
    pub fn new(catalog: UnitCatalog) -> Self {
        Self::with_config(catalog, IsolatorConfig::default())
    }

    /// Creates a registry with custom isolation settings.
    pub fn with_config(catalog: UnitCatalog, config: IsolatorConfig) -> Self {
        Self {
            catalog,
            isolator: Isolator::with_config(config),
            units: Vec::new(),
            modules: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Returns the entry-point catalog.
    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }

    /// Scans the immediate subdirectories of `root` for plugin units and
    /// registers the modules they contribute.
    ///
    /// Hidden directories and directories without a `plugin.json` are
    /// skipped. A failure in one unit or registrar is logged and isolated to
    /// that unit; discovery always continues. Returns descriptors of the
    /// newly registered modules, in registration order. Rescans are full
    /// rescans: an id registered again simply overwrites the previous entry.
    pub fn discover(&mut self, root: &Path) -> Vec<ModuleDescriptor> {
        let mut registered = Vec::new();

        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "cannot read plugin root");
                return registered;
            }
        };

        let mut candidates: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        // Deterministic scan order regardless of filesystem iteration order.
        candidates.sort();

        for dir in candidates {
            let Some(unit_name) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if unit_name.starts_with('.') {
                continue;
            }
            if !dir.join(UNIT_MANIFEST_FILE).exists() {
                continue;
            }

            match self.load_unit(&dir, unit_name) {
                Ok(descriptors) => registered.extend(descriptors),
                Err(e) => {
                    warn!(unit = unit_name, error = %e, "failed to load plugin unit");
                }
            }
        }

        info!(
            root = %root.display(),
            modules = registered.len(),
            "plugin discovery finished"
        );
        registered
    }

    /// Loads one unit directory. The unit record is created lazily on its
    /// first successful module; a unit yielding zero modules is not recorded.
    fn load_unit(
        &mut self,
        dir: &Path,
        unit_name: &str,
    ) -> Result<Vec<ModuleDescriptor>, RuntimeError> {
        let manifest = UnitManifest::load(dir)?;
        let entry = self
            .catalog
            .get(&manifest.entry)
            .ok_or_else(|| RuntimeError::UnknownEntry {
                entry: manifest.entry.clone(),
                unit: unit_name.to_string(),
            })?;

        let mut unit: Option<PluginUnit> = None;
        let mut descriptors = Vec::new();

        for registrar in entry() {
            let module = match registrar.register() {
                Ok(module) => module,
                Err(e) => {
                    warn!(
                        unit = unit_name,
                        registrar = registrar.name(),
                        error = %e,
                        "registrar failed"
                    );
                    continue;
                }
            };

            if let Err(errors) = validate_module(&module) {
                let detail = errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                warn!(
                    unit = unit_name,
                    registrar = registrar.name(),
                    error = %detail,
                    "registrar produced an invalid module"
                );
                continue;
            }

            let id = format!("{}_{}", unit_name, registrar.name());
            descriptors.push(module.descriptor(&id));

            if !self.modules.contains_key(&id) {
                self.order.push(id.clone());
            }
            self.modules.insert(id.clone(), module);

            unit.get_or_insert_with(|| PluginUnit::new(unit_name, dir, &manifest))
                .module_ids
                .push(id);
        }

        if let Some(unit) = unit {
            // A rescan replaces the previous record for this unit.
            self.units.retain(|u| u.id != unit.id);
            self.units.push(unit);
        }

        Ok(descriptors)
    }

    /// Looks up a module by id.
    pub fn get_module(&self, id: &str) -> Option<&Module> {
        self.modules.get(id)
    }

    /// Returns the descriptor of a module by id.
    pub fn get_descriptor(&self, id: &str) -> Option<ModuleDescriptor> {
        self.modules.get(id).map(|module| module.descriptor(id))
    }

    /// Returns descriptors of every registered module, in registration order.
    pub fn list_modules(&self) -> Vec<ModuleDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.modules.get(id).map(|module| module.descriptor(id)))
            .collect()
    }

    /// Finds the unit whose registrars produced the given module.
    pub fn resolve_owner(&self, module_id: &str) -> Option<&PluginUnit> {
        self.units.iter().find(|unit| unit.owns_module(module_id))
    }

    /// Returns the loaded units.
    pub fn units(&self) -> &[PluginUnit] {
        &self.units
    }

    /// Returns the number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Drops all discovery state. The catalog survives, so a later
    /// `discover` starts fresh.
    pub fn shutdown(&mut self) {
        self.units.clear();
        self.modules.clear();
        self.order.clear();
    }

    /// Executes a module by id.
    ///
    /// Failures never escape as panics or errors in isolated mode; every
    /// fault is folded into an error [`Outcome`] with a matching
    /// [`ErrorCode`]. In direct mode a handler panic propagates to the
    /// caller, who owns that failure boundary.
    pub fn execute(
        &self,
        id: &str,
        input: &JsonMap,
        context: Option<&ExecutionContext>,
        mode: ExecutionMode,
    ) -> Outcome {
        let Some(module) = self.modules.get(id) else {
            return Outcome::error_with_code(
                ErrorCode::ModuleNotFound,
                format!("module not registered: {id}"),
            );
        };

        match mode {
            ExecutionMode::Direct => {
                let started = Instant::now();
                let handler = (module.handler)();
                let mut outcome = handler.handle(input, context);
                if outcome.execution_time.is_none() {
                    outcome.execution_time = Some(started.elapsed().as_secs_f64());
                }
                outcome
            }
            ExecutionMode::Isolated => {
                let Some(unit) = self.resolve_owner(id) else {
                    return Outcome::error_with_code(
                        ErrorCode::PluginNotFound,
                        format!("no plugin unit owns module: {id}"),
                    );
                };
                self.isolator
                    .execute(unit, &module.handler_name, input, context)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabrica_contract::{
        Handler, Module, OutcomeStatus, RegisterError, Registrar, Widget, WidgetType,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct UserRegistrar;

    impl Registrar for UserRegistrar {
        fn name(&self) -> &'static str {
            "UserRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Ok(Module::builder("UserHandler", || Box::new(UserHandler))
                .group_name("users")
                .module_name("User generator")
                .widget(Widget::new("name", "Name", WidgetType::Input))
                .build())
        }
    }

    struct UserHandler;

    impl Handler for UserHandler {
        fn handle(&self, input: &JsonMap, _context: Option<&ExecutionContext>) -> Outcome {
            let name = input.get("name").and_then(|v| v.as_str()).unwrap_or("anon");
            Outcome::success(json!({ "name": name }), "generated")
        }
    }

    struct AuditRegistrar;

    impl Registrar for AuditRegistrar {
        fn name(&self) -> &'static str {
            "AuditRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Ok(Module::builder("AuditHandler", || Box::new(UserHandler))
                .group_name("users")
                .module_name("User audit")
                .build())
        }
    }

    struct BrokenRegistrar;

    impl Registrar for BrokenRegistrar {
        fn name(&self) -> &'static str {
            "BrokenRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            Err(RegisterError::new("deliberately broken"))
        }
    }

    struct InvalidRegistrar;

    impl Registrar for InvalidRegistrar {
        fn name(&self) -> &'static str {
            "InvalidRegistrar"
        }

        fn register(&self) -> Result<Module, RegisterError> {
            // Duplicate widget names fail module validation.
            Ok(Module::builder("DupHandler", || Box::new(UserHandler))
                .widget(Widget::new("x", "X", WidgetType::Input))
                .widget(Widget::new("x", "X", WidgetType::Input))
                .build())
        }
    }

    fn users_entry() -> Vec<Box<dyn Registrar>> {
        vec![Box::new(UserRegistrar), Box::new(AuditRegistrar)]
    }

    fn mixed_entry() -> Vec<Box<dyn Registrar>> {
        vec![
            Box::new(BrokenRegistrar),
            Box::new(UserRegistrar),
            Box::new(InvalidRegistrar),
        ]
    }

    fn broken_entry() -> Vec<Box<dyn Registrar>> {
        vec![Box::new(BrokenRegistrar)]
    }

    fn catalog() -> UnitCatalog {
        let mut catalog = UnitCatalog::new();
        catalog.register("users", users_entry);
        catalog.register("mixed", mixed_entry);
        catalog.register("broken", broken_entry);
        catalog
    }

    fn write_unit(root: &Path, dir_name: &str, entry: &str) {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(UNIT_MANIFEST_FILE),
            format!(r#"{{"name": "{dir_name}", "entry": "{entry}"}}"#),
        )
        .unwrap();
    }

    #[test]
    fn test_discover_empty_root_leaves_registry_empty() {
        let root = tempfile::tempdir().unwrap();
        let mut registry = Registry::new(catalog());

        let registered = registry.discover(root.path());
        assert!(registered.is_empty());
        assert!(registry.is_empty());
        assert!(registry.units().is_empty());
    }

    #[test]
    fn test_discover_skips_hidden_and_manifestless_directories() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), ".hidden", "users");
        std::fs::create_dir_all(root.path().join("no_manifest")).unwrap();
        std::fs::write(root.path().join("stray_file"), "nope").unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        let registered = registry.discover(root.path());

        let ids: Vec<&str> = registered.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["crew_UserRegistrar", "crew_AuditRegistrar"]);
        assert_eq!(registry.units().len(), 1);
    }

    #[test]
    fn test_two_registrars_yield_two_distinct_modules() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());

        let a = registry.get_module("crew_UserRegistrar").unwrap();
        let b = registry.get_module("crew_AuditRegistrar").unwrap();
        assert_eq!(a.module_name, "User generator");
        assert_eq!(b.module_name, "User audit");
    }

    #[test]
    fn test_failure_in_one_unit_is_isolated_to_that_unit() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "bad", "broken");
        write_unit(root.path(), "ghost", "no_such_entry");
        write_unit(root.path(), "good", "users");

        let mut registry = Registry::new(catalog());
        let registered = registry.discover(root.path());

        assert_eq!(registered.len(), 2);
        assert!(registry.get_module("good_UserRegistrar").is_some());
        // Units yielding zero modules are not recorded.
        assert_eq!(registry.units().len(), 1);
        assert_eq!(registry.units()[0].id, "good");
    }

    #[test]
    fn test_failing_registrars_do_not_block_siblings() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "mixture", "mixed");

        let mut registry = Registry::new(catalog());
        let registered = registry.discover(root.path());

        // Broken and invalid registrars contribute nothing; the good one
        // still lands.
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].id, "mixture_UserRegistrar");
    }

    #[test]
    fn test_list_modules_preserves_registration_order() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "alpha", "users");
        write_unit(root.path(), "beta", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());

        let ids: Vec<String> = registry.list_modules().into_iter().map(|d| d.id).collect();
        assert_eq!(
            ids,
            vec![
                "alpha_UserRegistrar",
                "alpha_AuditRegistrar",
                "beta_UserRegistrar",
                "beta_AuditRegistrar"
            ]
        );
    }

    #[test]
    fn test_rescan_overwrites_instead_of_duplicating() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());
        registry.discover(root.path());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.units().len(), 1);
        assert_eq!(registry.list_modules().len(), 2);
    }

    #[test]
    fn test_resolve_owner() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());

        let owner = registry.resolve_owner("crew_UserRegistrar").unwrap();
        assert_eq!(owner.id, "crew");
        assert_eq!(owner.entry, "users");
        assert!(registry.resolve_owner("ghost_Module").is_none());
    }

    #[test]
    fn test_shutdown_clears_state_but_keeps_catalog() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());
        assert!(!registry.is_empty());

        registry.shutdown();
        assert!(registry.is_empty());
        assert!(registry.units().is_empty());

        registry.discover(root.path());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_execute_unknown_module_in_both_modes() {
        let registry = Registry::new(catalog());
        let input = JsonMap::new();

        for mode in [ExecutionMode::Direct, ExecutionMode::Isolated] {
            let outcome = registry.execute("nope_Registrar", &input, None, mode);
            assert_eq!(outcome.error_code, Some(ErrorCode::ModuleNotFound));
            assert_eq!(outcome.status, OutcomeStatus::Error);
        }
    }

    #[test]
    fn test_direct_execution_fills_execution_time() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let mut registry = Registry::new(catalog());
        registry.discover(root.path());

        let mut input = JsonMap::new();
        input.insert("name".to_string(), json!("ada"));
        let outcome = registry.execute(
            "crew_UserRegistrar",
            &input,
            None,
            ExecutionMode::Direct,
        );

        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.data, json!({"name": "ada"}));
        assert!(outcome.execution_time.unwrap() >= 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn test_isolated_execution_through_a_stand_in_launcher() {
        let root = tempfile::tempdir().unwrap();
        write_unit(root.path(), "crew", "users");

        let config = IsolatorConfig::default()
            .launcher("sh")
            .launcher_args(vec![
                "-c".to_string(),
                r#"echo '{"success": true, "data": {"x": 1}, "message": "done", "execution_time": 0.1}'"#.to_string(),
                "launcher".to_string(),
            ]);
        let mut registry = Registry::with_config(catalog(), config);
        registry.discover(root.path());

        let outcome = registry.execute(
            "crew_UserRegistrar",
            &JsonMap::new(),
            None,
            ExecutionMode::Isolated,
        );
        assert_eq!(outcome.status, OutcomeStatus::Success);
        assert_eq!(outcome.data, json!({"x": 1}));
    }
}
