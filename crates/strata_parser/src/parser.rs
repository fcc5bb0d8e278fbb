//! The strata parser implementation.
//!
//! A recursive descent parser over the scanner's token stream, building an
//! arena-allocated AST. Parse errors are collected rather than aborting, so
//! one pass over a file reports every syntax problem it contains; the
//! evaluator never runs against a file that produced parse diagnostics.

use bumpalo::Bump;
use rustc_hash::FxHashSet;
use strata_ast::node::*;
use strata_ast::syntax_kind::SyntaxKind;
use strata_core::intern::StringInterner;
use strata_core::text::SourceLocation;
use strata_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use strata_scanner::Scanner;

/// Allocate a Vec into the arena as a slice.
fn alloc_vec_in<T>(arena: &Bump, vec: Vec<T>) -> &[T] {
    if vec.is_empty() {
        return &[];
    }
    arena.alloc_slice_fill_iter(vec)
}

/// The parser produces a SourceFile AST from description-file text.
pub struct Parser<'a> {
    arena: &'a Bump,
    scanner: Scanner,
    interner: StringInterner,
    file_name: String,
    source_text: String,
    diagnostics: DiagnosticCollection,
}

impl<'a> Parser<'a> {
    pub fn new(
        arena: &'a Bump,
        interner: &StringInterner,
        file_name: &str,
        source_text: &str,
    ) -> Self {
        let scanner = Scanner::new(file_name, source_text);
        Self {
            arena,
            scanner,
            interner: interner.clone(),
            file_name: file_name.to_string(),
            source_text: source_text.to_string(),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Parse the whole file, returning the AST and all collected diagnostics
    /// (scanner and parser, sorted by position).
    pub fn parse_source_file(mut self) -> (SourceFile<'a>, DiagnosticCollection) {
        self.next_token();
        let statements = self.parse_statements();
        let end = self.source_text.len() as u32;
        let line_map = self.scanner.line_map().clone();

        let mut diagnostics = self.scanner.take_diagnostics();
        diagnostics.extend(self.diagnostics);
        diagnostics.sort();

        let source_file = SourceFile {
            data: NodeData::new(SyntaxKind::SourceFile, 0, end),
            statements,
            file_name: self.file_name,
            text: self.source_text,
            line_map,
        };
        (source_file, diagnostics)
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current_token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    #[inline]
    fn next_token(&mut self) -> SyntaxKind {
        self.scanner.scan()
    }

    #[inline]
    fn token_pos(&self) -> u32 {
        self.scanner.token_start()
    }

    #[inline]
    fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    fn expect_token(&mut self, kind: SyntaxKind) {
        if self.current_token() == kind {
            self.next_token();
        } else {
            let text = kind
                .punctuation_text()
                .or_else(|| kind.keyword_text())
                .unwrap_or("token");
            self.error(&messages::_0_EXPECTED, &[text]);
        }
    }

    fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) {
        let location = SourceLocation::resolve(
            &self.file_name,
            self.scanner.line_map(),
            self.token_pos(),
        );
        self.diagnostics
            .add(Diagnostic::with_location(location, message, args));
    }

    fn parse_identifier(&mut self) -> Option<Identifier> {
        if self.current_token() != SyntaxKind::Identifier {
            self.error(&messages::IDENTIFIER_EXPECTED, &[]);
            return None;
        }
        let pos = self.token_pos();
        let end = self.token_end();
        let text_name = self.scanner.token_value().to_string();
        let text = self.interner.intern(&text_name);
        self.next_token();
        Some(Identifier {
            data: NodeData::new(SyntaxKind::Identifier, pos, end),
            text,
            text_name,
        })
    }

    // ========================================================================
    // Statement parsing
    // ========================================================================

    fn parse_statements(&mut self) -> &'a [Statement<'a>] {
        let mut statements = Vec::new();
        while self.current_token() != SyntaxKind::EndOfFileToken {
            let saved_pos = self.token_pos();
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }

            // Error recovery: if the parser hasn't advanced, skip the token
            // so a single bad token cannot loop forever.
            if self.token_pos() == saved_pos && self.current_token() != SyntaxKind::EndOfFileToken
            {
                self.next_token();
            }
        }
        alloc_vec_in(self.arena, statements)
    }

    /// A statement is `name = expr`, `name += expr`, or `type { props }`.
    fn parse_statement(&mut self) -> Option<Statement<'a>> {
        if self.current_token() != SyntaxKind::Identifier {
            self.error(&messages::ASSIGNMENT_OR_MODULE_EXPECTED, &[]);
            return None;
        }
        let name = self.parse_identifier()?;

        match self.current_token() {
            SyntaxKind::EqualsToken => self.parse_assignment(name, AssignmentOp::Assign),
            SyntaxKind::PlusEqualsToken => self.parse_assignment(name, AssignmentOp::Append),
            SyntaxKind::OpenBraceToken => self.parse_module_definition(name),
            _ => {
                self.error(&messages::ASSIGNMENT_OR_MODULE_EXPECTED, &[]);
                None
            }
        }
    }

    fn parse_assignment(
        &mut self,
        name: Identifier,
        op: AssignmentOp,
    ) -> Option<Statement<'a>> {
        self.next_token(); // `=` or `+=`
        let value = self.parse_expression()?;
        let range = name.data.range.union(&value.range());
        let assignment = self.arena.alloc(Assignment {
            data: NodeData::new(SyntaxKind::Assignment, range.pos, range.end),
            name,
            op,
            value,
        });
        Some(Statement::Assignment(assignment))
    }

    fn parse_module_definition(&mut self, module_type: Identifier) -> Option<Statement<'a>> {
        let pos = module_type.data.range.pos;
        self.next_token(); // `{`

        let mut properties: Vec<Property<'a>> = Vec::new();
        let mut seen = FxHashSet::default();
        while self.current_token() != SyntaxKind::CloseBraceToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let saved_pos = self.token_pos();
            match self.parse_property() {
                Some(prop) => {
                    if seen.insert(prop.name.text) {
                        properties.push(prop);
                    } else {
                        let location = SourceLocation::resolve(
                            &self.file_name,
                            self.scanner.line_map(),
                            prop.data.range.pos,
                        );
                        self.diagnostics.add(Diagnostic::with_location(
                            location,
                            &messages::DUPLICATE_PROPERTY_0,
                            &[prop.name.text_name.as_str()],
                        ));
                    }
                    if self.current_token() == SyntaxKind::CommaToken {
                        self.next_token();
                    } else if self.current_token() != SyntaxKind::CloseBraceToken {
                        self.error(&messages::_0_EXPECTED, &[","]);
                    }
                }
                None => {
                    // Recovery: skip the offending token so a bad property
                    // cannot loop forever.
                    if self.token_pos() == saved_pos
                        && self.current_token() != SyntaxKind::EndOfFileToken
                    {
                        self.next_token();
                    }
                }
            }
        }
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBraceToken);

        let definition = self.arena.alloc(ModuleDefinition {
            data: NodeData::new(SyntaxKind::ModuleDefinition, pos, end),
            module_type,
            properties: alloc_vec_in(self.arena, properties),
        });
        Some(Statement::ModuleDefinition(definition))
    }

    fn parse_property(&mut self) -> Option<Property<'a>> {
        if self.current_token() != SyntaxKind::Identifier {
            self.error(&messages::PROPERTY_ASSIGNMENT_EXPECTED, &[]);
            return None;
        }
        let name = self.parse_identifier()?;
        self.expect_token(SyntaxKind::ColonToken);
        let value = self.parse_expression()?;
        let range = name.data.range.union(&value.range());
        Some(Property {
            data: NodeData::new(SyntaxKind::Property, range.pos, range.end),
            name,
            value,
        })
    }

    // ========================================================================
    // Expression parsing
    // ========================================================================

    /// Expressions are primaries joined by left-associative `+`.
    fn parse_expression(&mut self) -> Option<Expression<'a>> {
        let mut left = self.parse_primary_expression()?;
        while self.current_token() == SyntaxKind::PlusToken {
            self.next_token();
            let right = self.parse_primary_expression()?;
            let range = left.range().union(&right.range());
            let concat = self.arena.alloc(ConcatExpression {
                data: NodeData::new(SyntaxKind::ConcatExpression, range.pos, range.end),
                left,
                right,
            });
            left = Expression::Concat(concat);
        }
        Some(left)
    }

    fn parse_primary_expression(&mut self) -> Option<Expression<'a>> {
        let pos = self.token_pos();
        let end = self.token_end();
        match self.current_token() {
            SyntaxKind::StringLiteral => {
                let value = self.scanner.token_value().to_string();
                self.next_token();
                let literal = self.arena.alloc(StringLiteral {
                    data: NodeData::new(SyntaxKind::StringLiteral, pos, end),
                    value,
                });
                Some(Expression::StringLiteral(literal))
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                let value = self.current_token() == SyntaxKind::TrueKeyword;
                self.next_token();
                let literal = self.arena.alloc(BoolLiteral {
                    data: NodeData::new(SyntaxKind::BoolLiteral, pos, end),
                    value,
                });
                Some(Expression::BoolLiteral(literal))
            }
            SyntaxKind::OpenBracketToken => self.parse_list_literal(),
            SyntaxKind::Identifier => {
                let name = self.parse_identifier()?;
                let reference = self.arena.alloc(VariableReference {
                    data: NodeData::new(SyntaxKind::VariableReference, pos, end),
                    name,
                });
                Some(Expression::VariableReference(reference))
            }
            _ => {
                self.error(&messages::EXPRESSION_EXPECTED, &[]);
                None
            }
        }
    }

    fn parse_list_literal(&mut self) -> Option<Expression<'a>> {
        let pos = self.token_pos();
        self.next_token(); // `[`

        let mut elements = Vec::new();
        while self.current_token() != SyntaxKind::CloseBracketToken
            && self.current_token() != SyntaxKind::EndOfFileToken
        {
            let element = self.parse_expression()?;
            elements.push(element);
            if self.current_token() == SyntaxKind::CommaToken {
                self.next_token();
            } else {
                break;
            }
        }
        let end = self.token_end();
        self.expect_token(SyntaxKind::CloseBracketToken);

        let list = self.arena.alloc(ListLiteral {
            data: NodeData::new(SyntaxKind::ListExpression, pos, end),
            elements: alloc_vec_in(self.arena, elements),
        });
        Some(Expression::ListLiteral(list))
    }
}
