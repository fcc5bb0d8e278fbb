//! strata_scope: Scope tree and variable binding tables.
//!
//! One Scope per directory that owns a description file, linked to the
//! nearest ancestor directory that also owns one. Each Scope holds a binding
//! table whose entries move through the Unbound -> Bound -> Referenced state
//! machine while the directory's statements are evaluated, then freeze.

pub mod binding;
pub mod scope;
pub mod value;

pub use binding::{Binding, BindingState, BindingTable};
pub use scope::{Scope, ScopeId, ScopeTree, ScopeTreeError};
pub use value::{KindMismatch, Value};
