//! Unit registry: which computation kinds exist and under which names.
//!
//! Unit types are grouped into modules. Each registered type is addressable as
//! `"<package>/<name>"`. A module may carry one [`ModuleHook`], which is told
//! about startup, graph imports and shutdown.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::graph::NodeGraph;
use crate::pipeline::unit::UnitType;
use crate::pipeline::units;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identity of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub package: String,
    pub version: String,
}

impl ModuleInfo {
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
        }
    }
}

/// Module-level lifecycle callbacks.
pub trait ModuleHook: Send {
    /// Called once when the module is registered.
    fn startup(&mut self) {}

    /// Called after the pipeline imported a new node tree.
    fn pipeline_update(&mut self, _graph: &NodeGraph) {}

    /// Called when the pipeline shuts down.
    fn shutdown(&mut self) {}
}

/// A registered module and the fully qualified names of its unit types.
#[derive(Debug, Clone)]
pub struct ModuleEntry {
    pub info: ModuleInfo,
    pub unit_types: Vec<String>,
}

#[derive(Default)]
pub struct UnitRegistry {
    modules: BTreeMap<String, ModuleEntry>,
    units: BTreeMap<String, Arc<dyn UnitType>>,
    hooks: BTreeMap<String, Box<dyn ModuleHook>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `core` module already registered.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let (info, unit_types) = units::core_module();
        // A fresh registry cannot already contain `core`.
        if let Err(e) = registry.register_module(info, unit_types, None) {
            tracing::error!("Failed to register built-in units: {}", e);
        }
        registry
    }

    /// Register a module. Disabled unit types are skipped. If a hook is
    /// given, its `startup` runs before this returns.
    pub fn register_module(
        &mut self,
        info: ModuleInfo,
        unit_types: Vec<Arc<dyn UnitType>>,
        hook: Option<Box<dyn ModuleHook>>,
    ) -> PipelineResult<()> {
        if self.modules.contains_key(&info.package) {
            return Err(PipelineError::DuplicateModule(info.package));
        }

        let mut names = Vec::with_capacity(unit_types.len());
        for kind in unit_types {
            if kind.disabled() {
                tracing::debug!("Skipping disabled unit {}/{}", info.package, kind.name());
                continue;
            }
            let qualified = format!("{}/{}", info.package, kind.name());
            self.units.insert(qualified.clone(), kind);
            names.push(qualified);
        }

        if let Some(mut hook) = hook {
            hook.startup();
            self.hooks.insert(info.package.clone(), hook);
        }

        tracing::info!(
            "Registered module {} v{} ({} unit types)",
            info.package,
            info.version,
            names.len()
        );
        self.modules.insert(
            info.package.clone(),
            ModuleEntry {
                info,
                unit_types: names,
            },
        );
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<Arc<dyn UnitType>> {
        self.units.get(type_name).cloned()
    }

    /// Like [`get`](Self::get) but unknown names are an error.
    pub fn resolve(&self, type_name: &str) -> PipelineResult<Arc<dyn UnitType>> {
        self.get(type_name)
            .ok_or_else(|| PipelineError::UnknownUnitType(type_name.to_string()))
    }

    /// All qualified unit type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.values()
    }

    pub fn pipeline_update(&mut self, graph: &NodeGraph) {
        for hook in self.hooks.values_mut() {
            hook.pipeline_update(graph);
        }
    }

    pub fn shutdown(&mut self) {
        for (package, hook) in self.hooks.iter_mut() {
            tracing::debug!("Shutting down module {}", package);
            hook.shutdown();
        }
    }
}
