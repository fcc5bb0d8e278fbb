//! The scope tree.
//!
//! Scopes live in a flat table indexed by `ScopeId`; the parent link is a
//! plain handle, never a shared mutable reference. Index 0 is the implicit
//! root scope: it owns no directory, carries no bindings, and is frozen from
//! the start, so directories without an owning ancestor all inherit from it.

use crate::binding::{Binding, BindingTable};
use rustc_hash::FxHashMap;
use strata_core::intern::InternedString;
use thiserror::Error;

/// Handle to a scope in the tree's flat table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// The implicit root scope.
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The binding environment owned by one directory's description file.
#[derive(Debug)]
pub struct Scope {
    /// This scope's handle.
    pub id: ScopeId,
    /// Directory path relative to the tree root; empty for the implicit root
    /// and for a description file at the root directory itself.
    pub dir: String,
    /// The nearest ancestor directory owning a description file, or the
    /// implicit root. `None` only for the implicit root itself.
    pub parent: Option<ScopeId>,
    /// The variables bound by this directory's statements.
    pub bindings: BindingTable,
    frozen: bool,
}

impl Scope {
    /// Whether this scope's binding table is immutable for the rest of the run.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

/// Errors from scope tree construction. Construction has no semantic
/// validation responsibility; only inconsistent input fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeTreeError {
    #[error("duplicate directory {0:?}")]
    DuplicateDirectory(String),
}

/// All scopes of one evaluation run.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    by_dir: FxHashMap<String, ScopeId>,
}

impl ScopeTree {
    /// Build the tree from the set of directories owning a description file.
    /// Paths are `/`-separated and relative to the tree root ("" is the root
    /// directory itself). Each scope links to the nearest ancestor directory
    /// present in the set, or to the implicit root.
    pub fn build(dirs: &[String]) -> Result<Self, ScopeTreeError> {
        let mut tree = Self {
            scopes: vec![Scope {
                id: ScopeId::ROOT,
                dir: String::new(),
                parent: None,
                bindings: BindingTable::new(),
                frozen: true,
            }],
            by_dir: FxHashMap::default(),
        };

        for dir in dirs {
            let id = ScopeId(tree.scopes.len() as u32);
            if tree.by_dir.insert(dir.clone(), id).is_some() {
                return Err(ScopeTreeError::DuplicateDirectory(dir.clone()));
            }
            tree.scopes.push(Scope {
                id,
                dir: dir.clone(),
                parent: None,
                bindings: BindingTable::new(),
                frozen: false,
            });
        }

        // Second pass: resolve the nearest owning ancestor for every scope.
        for i in 1..tree.scopes.len() {
            let parent = tree.nearest_ancestor(&tree.scopes[i].dir);
            tree.scopes[i].parent = Some(parent);
        }
        Ok(tree)
    }

    /// The nearest strict ancestor of `dir` that owns a scope, else the root.
    fn nearest_ancestor(&self, dir: &str) -> ScopeId {
        let mut current = dir;
        while let Some(idx) = current.rfind('/') {
            current = &current[..idx];
            if let Some(&id) = self.by_dir.get(current) {
                return id;
            }
        }
        // The root directory "" is a real candidate when it owns a file.
        if !dir.is_empty() {
            if let Some(&id) = self.by_dir.get("") {
                return id;
            }
        }
        ScopeId::ROOT
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// The scope owned by a directory, if that directory has one.
    pub fn scope_for_dir(&self, dir: &str) -> Option<ScopeId> {
        self.by_dir.get(dir).copied()
    }

    /// Look up `name` starting at the parent chain of `start` (inclusive),
    /// nearest scope first.
    pub fn lookup_from(&self, start: ScopeId, name: InternedString) -> Option<&Binding> {
        let mut current = Some(start);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(binding) = scope.bindings.get(&name) {
                return Some(binding);
            }
            current = scope.parent;
        }
        None
    }

    /// Install a directory's completed binding table and freeze the scope.
    /// The parent must already be frozen: inheritance lookups rely on it.
    pub fn commit(&mut self, id: ScopeId, bindings: BindingTable) {
        debug_assert!(
            self.get(id)
                .parent
                .map(|p| self.get(p).is_frozen())
                .unwrap_or(true),
            "scope committed before its parent was frozen"
        );
        let scope = &mut self.scopes[id.index()];
        debug_assert!(!scope.frozen, "scope committed twice");
        scope.bindings = bindings;
        scope.frozen = true;
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.len() == 1
    }

    /// All scopes, the implicit root included.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }
}
