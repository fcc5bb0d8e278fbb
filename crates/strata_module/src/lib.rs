//! strata_module: Module-type registry and evaluated module instances.
//!
//! The embedding build tool registers the module types it understands before
//! evaluation; each successfully evaluated directory then yields its module
//! instances with fully resolved property values, ready for the downstream
//! graph generator.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use strata_core::text::SourceLocation;
use strata_scope::Value;

/// A registered module type.
#[derive(Debug, Clone)]
pub struct ModuleType {
    /// The type name as written in description files (e.g. `library`).
    pub name: String,
    /// One-line description, surfaced by tooling.
    pub summary: String,
}

/// The set of module types known to the embedding build tool.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    types: FxHashMap<String, ModuleType>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            types: FxHashMap::default(),
        }
    }

    /// Register a module type. Re-registering a name replaces the entry.
    pub fn register(&mut self, name: &str, summary: &str) {
        self.types.insert(
            name.to_string(),
            ModuleType {
                name: name.to_string(),
                summary: summary.to_string(),
            },
        );
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ModuleType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = &ModuleType> {
        self.types.values()
    }
}

/// One evaluated module definition: its type, its resolved properties in
/// source order, and where it was defined.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleInstance {
    #[serde(rename = "type")]
    pub type_name: String,
    pub properties: IndexMap<String, Value>,
    #[serde(skip)]
    pub location: SourceLocation,
}

impl ModuleInstance {
    /// The module's `name` property, when present and a string.
    pub fn name(&self) -> Option<&str> {
        match self.properties.get("name") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// Serialize evaluated modules as a JSON build-graph fragment.
pub fn to_json(modules: &[ModuleInstance]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(modules)
}
