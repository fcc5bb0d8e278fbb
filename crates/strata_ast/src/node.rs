//! AST node definitions for strata description files.
//!
//! A description file is a flat list of statements: variable assignments,
//! variable appends, and module definitions. Nodes reference children via
//! arena-allocated slices; the arena outlives every SourceFile parsed into it.

use crate::syntax_kind::SyntaxKind;
use strata_core::intern::InternedString;
use strata_core::text::{LineMap, SourceLocation, TextPos, TextRange};

/// Common data shared by all AST nodes.
#[derive(Debug, Clone, Copy)]
pub struct NodeData {
    /// The kind of this node.
    pub kind: SyntaxKind,
    /// Source position range.
    pub range: TextRange,
}

impl NodeData {
    pub fn new(kind: SyntaxKind, pos: u32, end: u32) -> Self {
        Self {
            kind,
            range: TextRange::new(pos, end),
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

// ============================================================================
// Source File
// ============================================================================

/// One parsed description file.
#[derive(Debug)]
pub struct SourceFile<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    /// File path relative to the tree root (e.g. `lib/Strata.build`).
    pub file_name: String,
    pub text: String,
    /// Offset-to-line conversion for this file's text.
    pub line_map: LineMap,
}

impl SourceFile<'_> {
    /// Resolve a byte offset in this file to a printable location.
    pub fn location_of(&self, pos: TextPos) -> SourceLocation {
        SourceLocation::resolve(&self.file_name, &self.line_map, pos)
    }
}

// ============================================================================
// Identifier
// ============================================================================

/// An identifier: a variable name, property name, or module type name.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub data: NodeData,
    /// The interned text of this identifier.
    pub text: InternedString,
    /// The actual text of this identifier as a plain string.
    pub text_name: String,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Assignment(&'a Assignment<'a>),
    ModuleDefinition(&'a ModuleDefinition<'a>),
}

impl Statement<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Statement::Assignment(n) => n.data.range,
            Statement::ModuleDefinition(n) => n.data.range,
        }
    }
}

/// The assignment operator: direct binding or accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    /// `=`
    Assign,
    /// `+=`
    Append,
}

impl AssignmentOp {
    pub fn token_text(self) -> &'static str {
        match self {
            AssignmentOp::Assign => "=",
            AssignmentOp::Append => "+=",
        }
    }
}

/// `name = expr` or `name += expr`.
#[derive(Debug)]
pub struct Assignment<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub op: AssignmentOp,
    pub value: Expression<'a>,
}

/// `module_type { prop: expr, ... }`.
#[derive(Debug)]
pub struct ModuleDefinition<'a> {
    pub data: NodeData,
    pub module_type: Identifier,
    pub properties: NodeList<'a, Property<'a>>,
}

/// One `prop: expr` entry inside a module definition.
#[derive(Debug)]
pub struct Property<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub value: Expression<'a>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    StringLiteral(&'a StringLiteral),
    BoolLiteral(&'a BoolLiteral),
    ListLiteral(&'a ListLiteral<'a>),
    VariableReference(&'a VariableReference),
    Concat(&'a ConcatExpression<'a>),
}

impl Expression<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Expression::StringLiteral(n) => n.data.range,
            Expression::BoolLiteral(n) => n.data.range,
            Expression::ListLiteral(n) => n.data.range,
            Expression::VariableReference(n) => n.data.range,
            Expression::Concat(n) => n.data.range,
        }
    }
}

/// `"text"` with escapes already decoded.
#[derive(Debug)]
pub struct StringLiteral {
    pub data: NodeData,
    pub value: String,
}

/// `true` or `false`.
#[derive(Debug)]
pub struct BoolLiteral {
    pub data: NodeData,
    pub value: bool,
}

/// `[expr, ...]`.
#[derive(Debug)]
pub struct ListLiteral<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

/// A read of a variable wherever its name appears in a value expression.
#[derive(Debug)]
pub struct VariableReference {
    pub data: NodeData,
    pub name: Identifier,
}

/// `left + right`, concatenating strings or lists.
#[derive(Debug)]
pub struct ConcatExpression<'a> {
    pub data: NodeData,
    pub left: Expression<'a>,
    pub right: Expression<'a>,
}
