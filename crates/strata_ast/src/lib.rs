//! strata_ast: AST node definitions for strata description files.

pub mod node;
pub mod syntax_kind;

pub use node::*;
pub use syntax_kind::SyntaxKind;
