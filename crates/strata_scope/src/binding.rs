//! Binding records and per-scope binding tables.

use crate::value::Value;
use rustc_hash::FxHashMap;
use strata_core::intern::InternedString;
use strata_core::text::SourceLocation;

/// The state of one variable within one scope.
///
/// State only ever advances `Unbound -> Bound -> Referenced`. Appending to a
/// `Bound` binding keeps it `Bound`; only an explicit read moves it to
/// `Referenced`. The defining location is recorded when the binding becomes
/// `Bound` and survives the transition, for "previous assignment" diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingState {
    /// Never assigned.
    Unbound,
    /// Assigned, not yet read.
    Bound {
        value: Value,
        location: SourceLocation,
    },
    /// Assigned and read at least once.
    Referenced {
        value: Value,
        location: SourceLocation,
    },
}

/// One variable within one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    /// The variable name (interned).
    pub name: InternedString,
    /// The binding state.
    pub state: BindingState,
}

impl Binding {
    /// Create a binding that has just been assigned.
    pub fn bound(name: InternedString, value: Value, location: SourceLocation) -> Self {
        Self {
            name,
            state: BindingState::Bound { value, location },
        }
    }

    /// The current value, if assigned.
    pub fn value(&self) -> Option<&Value> {
        match &self.state {
            BindingState::Unbound => None,
            BindingState::Bound { value, .. } | BindingState::Referenced { value, .. } => {
                Some(value)
            }
        }
    }

    /// The location recorded when this binding became `Bound`.
    pub fn location(&self) -> Option<&SourceLocation> {
        match &self.state {
            BindingState::Unbound => None,
            BindingState::Bound { location, .. } | BindingState::Referenced { location, .. } => {
                Some(location)
            }
        }
    }

    /// Whether this binding has been read since it was bound.
    pub fn is_referenced(&self) -> bool {
        matches!(self.state, BindingState::Referenced { .. })
    }

    /// Record a read: `Bound` advances to `Referenced`, `Referenced` stays.
    pub fn mark_referenced(&mut self) {
        let state = std::mem::replace(&mut self.state, BindingState::Unbound);
        self.state = match state {
            BindingState::Bound { value, location } => {
                BindingState::Referenced { value, location }
            }
            other => other,
        };
    }
}

/// A binding table maps variable names to bindings within one scope.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    table: FxHashMap<InternedString, Binding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    pub fn get(&self, name: &InternedString) -> Option<&Binding> {
        self.table.get(name)
    }

    pub fn get_mut(&mut self, name: &InternedString) -> Option<&mut Binding> {
        self.table.get_mut(name)
    }

    /// Insert a binding under its own name. Names are unique per scope; the
    /// caller checks for conflicts before inserting.
    pub fn insert(&mut self, binding: Binding) {
        self.table.insert(binding.name, binding);
    }

    pub fn has(&self, name: &InternedString) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InternedString, &Binding)> {
        self.table.iter()
    }
}
