//! strata_evaluator: The binding state machine.
//!
//! Replays one directory's statements against its scope, with read access to
//! the chain of frozen ancestor scopes. Assignments bind, appends accumulate,
//! and every variable read drives the local binding from `Bound` to
//! `Referenced`. Evaluation is fail-fast: the first violation aborts the
//! directory and surfaces exactly one diagnostic.
//!
//! The evaluator owns the directory's binding table while it runs and hands
//! it back on success; the caller commits the table into the scope tree,
//! freezing it for descendants. The tree itself is never written here, which
//! is what makes sibling directories safe to evaluate in parallel.

use indexmap::IndexMap;
use strata_ast::node::*;
use strata_core::intern::InternedString;
use strata_core::text::SourceLocation;
use strata_diagnostics::{messages, Diagnostic, DiagnosticMessage};
use strata_module::ModuleInstance;
use strata_scope::{Binding, BindingState, BindingTable, ScopeId, ScopeTree, Value};

/// Where a lookup found a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Locality {
    /// In the scope being evaluated.
    Local,
    /// In an ancestor scope (already frozen).
    Inherited,
}

/// The result of a successful directory evaluation.
#[derive(Debug)]
pub struct EvalOutput {
    /// The directory's completed binding table, ready to commit and freeze.
    pub bindings: BindingTable,
    /// The module instances defined by the directory, in source order.
    pub modules: Vec<ModuleInstance>,
}

/// Evaluates one directory's statement stream. One evaluator per directory
/// per run; it is consumed by [`Evaluator::evaluate`].
pub struct Evaluator<'t> {
    tree: &'t ScopeTree,
    scope: ScopeId,
    locals: BindingTable,
    modules: Vec<ModuleInstance>,
}

impl<'t> Evaluator<'t> {
    /// Create an evaluator for the scope owned by one directory. Every
    /// ancestor of `scope` must already be frozen.
    pub fn new(tree: &'t ScopeTree, scope: ScopeId) -> Self {
        debug_assert!(!tree.get(scope).is_frozen(), "scope already evaluated");
        Self {
            tree,
            scope,
            locals: BindingTable::new(),
            modules: Vec::new(),
        }
    }

    /// Replay the directory's statements in source order. Fail-fast: the
    /// first violation aborts and becomes the directory's one diagnostic.
    pub fn evaluate(mut self, source_file: &SourceFile<'_>) -> Result<EvalOutput, Diagnostic> {
        for statement in source_file.statements.iter() {
            match statement {
                Statement::Assignment(n) => self.evaluate_assignment(source_file, n)?,
                Statement::ModuleDefinition(n) => self.evaluate_module(source_file, n)?,
            }
        }
        Ok(EvalOutput {
            bindings: self.locals,
            modules: self.modules,
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn evaluate_assignment(
        &mut self,
        source_file: &SourceFile<'_>,
        assignment: &Assignment<'_>,
    ) -> Result<(), Diagnostic> {
        // The right-hand side is evaluated before the left-hand name is
        // touched, so `x = x` on an unbound x is an undefined reference.
        let value = self.evaluate_expression(source_file, &assignment.value)?;
        let location = source_file.location_of(assignment.name.data.range.pos);
        match assignment.op {
            AssignmentOp::Assign => self.assign(assignment, value, location),
            AssignmentOp::Append => self.append(assignment, value, location),
        }
    }

    /// `name = value`: legal only while no binding for the name is reachable
    /// anywhere in the ancestor chain.
    fn assign(
        &mut self,
        assignment: &Assignment<'_>,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), Diagnostic> {
        let name = &assignment.name;
        match self.lookup(name.text) {
            Some((Locality::Local, previous)) => Err(self.conflict(
                &messages::VARIABLE_ALREADY_SET_0,
                name,
                location,
                previous,
            )),
            Some((Locality::Inherited, previous)) => Err(self.conflict(
                &messages::VARIABLE_ALREADY_SET_IN_INHERITED_SCOPE_0,
                name,
                location,
                previous,
            )),
            None => {
                self.locals
                    .insert(Binding::bound(name.text, value, location));
                Ok(())
            }
        }
    }

    /// `name += value`: legal only against a local binding that has not yet
    /// been read.
    fn append(
        &mut self,
        assignment: &Assignment<'_>,
        value: Value,
        location: SourceLocation,
    ) -> Result<(), Diagnostic> {
        let name = &assignment.name;
        if let Some(binding) = self.locals.get_mut(&name.text) {
            return match &mut binding.state {
                BindingState::Bound {
                    value: existing, ..
                } => match existing.append(&value) {
                    Ok(()) => Ok(()),
                    Err(mismatch) => Err(Diagnostic::with_location(
                        location,
                        &messages::OPERATOR_PLUS_CANNOT_BE_APPLIED_TO_TYPES_0_AND_1,
                        &[mismatch.left, mismatch.right],
                    )),
                },
                BindingState::Referenced { location: bound_at, .. } => {
                    let previous = bound_at.clone();
                    Err(Diagnostic::with_location(
                        location,
                        &messages::MODIFIED_VARIABLE_0_AFTER_REFERENCING,
                        &[name.text_name.as_str()],
                    )
                    .with_related(Diagnostic::with_location(
                        previous,
                        &messages::PREVIOUS_ASSIGNMENT,
                        &[name.text_name.as_str()],
                    )))
                }
                // Locals are only ever inserted already-bound.
                BindingState::Unbound => Err(Diagnostic::with_location(
                    location,
                    &messages::MODIFIED_NON_EXISTENT_VARIABLE_0,
                    &[name.text_name.as_str()],
                )),
            };
        }

        match self.lookup_inherited(name.text) {
            Some(previous) => {
                let previous_location = previous.location().cloned();
                let mut diagnostic = Diagnostic::with_location(
                    location,
                    &messages::MODIFIED_NON_LOCAL_VARIABLE_0,
                    &[name.text_name.as_str()],
                );
                if let Some(previous_location) = previous_location {
                    diagnostic = diagnostic.with_related(Diagnostic::with_location(
                        previous_location,
                        &messages::PREVIOUS_ASSIGNMENT,
                        &[name.text_name.as_str()],
                    ));
                }
                Err(diagnostic)
            }
            None => Err(Diagnostic::with_location(
                location,
                &messages::MODIFIED_NON_EXISTENT_VARIABLE_0,
                &[name.text_name.as_str()],
            )),
        }
    }

    fn evaluate_module(
        &mut self,
        source_file: &SourceFile<'_>,
        definition: &ModuleDefinition<'_>,
    ) -> Result<(), Diagnostic> {
        let mut properties = IndexMap::new();
        for property in definition.properties.iter() {
            let value = self.evaluate_expression(source_file, &property.value)?;
            properties.insert(property.name.text_name.clone(), value);
        }
        self.modules.push(ModuleInstance {
            type_name: definition.module_type.text_name.clone(),
            properties,
            location: source_file.location_of(definition.data.range.pos),
        });
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Evaluate a value expression, resolving references left-to-right as
    /// written.
    fn evaluate_expression(
        &mut self,
        source_file: &SourceFile<'_>,
        expression: &Expression<'_>,
    ) -> Result<Value, Diagnostic> {
        match expression {
            Expression::StringLiteral(n) => Ok(Value::String(n.value.clone())),
            Expression::BoolLiteral(n) => Ok(Value::Bool(n.value)),
            Expression::ListLiteral(n) => {
                let mut elements = Vec::with_capacity(n.elements.len());
                for element in n.elements.iter() {
                    elements.push(self.evaluate_expression(source_file, element)?);
                }
                Ok(Value::List(elements))
            }
            Expression::VariableReference(n) => self.evaluate_reference(source_file, n),
            Expression::Concat(n) => {
                let left = self.evaluate_expression(source_file, &n.left)?;
                let right = self.evaluate_expression(source_file, &n.right)?;
                Value::concat(&left, &right).map_err(|mismatch| {
                    Diagnostic::with_location(
                        source_file.location_of(n.data.range.pos),
                        &messages::OPERATOR_PLUS_CANNOT_BE_APPLIED_TO_TYPES_0_AND_1,
                        &[mismatch.left, mismatch.right],
                    )
                })
            }
        }
    }

    /// Read a variable. A local read drives the binding to `Referenced`; an
    /// inherited read leaves the frozen ancestor untouched.
    fn evaluate_reference(
        &mut self,
        source_file: &SourceFile<'_>,
        reference: &VariableReference,
    ) -> Result<Value, Diagnostic> {
        let name = &reference.name;
        if let Some(binding) = self.locals.get_mut(&name.text) {
            binding.mark_referenced();
            if let Some(value) = binding.value() {
                return Ok(value.clone());
            }
        } else if let Some(binding) = self.lookup_inherited(name.text) {
            if let Some(value) = binding.value() {
                return Ok(value.clone());
            }
        }
        Err(Diagnostic::with_location(
            source_file.location_of(reference.data.range.pos),
            &messages::UNDEFINED_VARIABLE_0,
            &[name.text_name.as_str()],
        ))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find "the" binding of a name: local table first, then each ancestor
    /// nearest-first.
    fn lookup(&self, name: InternedString) -> Option<(Locality, &Binding)> {
        if let Some(binding) = self.locals.get(&name) {
            return Some((Locality::Local, binding));
        }
        self.lookup_inherited(name)
            .map(|binding| (Locality::Inherited, binding))
    }

    /// Find a binding in the ancestor chain only.
    fn lookup_inherited(&self, name: InternedString) -> Option<&Binding> {
        let parent = self.tree.get(self.scope).parent?;
        self.tree.lookup_from(parent, name)
    }

    /// A duplicate-assignment diagnostic carrying the previous location both
    /// in the message template and as related information.
    fn conflict(
        &self,
        message: &DiagnosticMessage,
        name: &Identifier,
        location: SourceLocation,
        previous: &Binding,
    ) -> Diagnostic {
        match previous.location() {
            Some(previous_location) => {
                let rendered = previous_location.to_string();
                Diagnostic::with_location(location, message, &[rendered.as_str()]).with_related(
                    Diagnostic::with_location(
                        previous_location.clone(),
                        &messages::PREVIOUS_ASSIGNMENT,
                        &[name.text_name.as_str()],
                    ),
                )
            }
            None => Diagnostic::with_location(location, message, &[name.text_name.as_str()]),
        }
    }
}
