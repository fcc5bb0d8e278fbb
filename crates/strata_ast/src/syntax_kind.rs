//! Token and node kinds for the strata description language.

use std::fmt;

/// The kind of a token or AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Unknown,
    EndOfFileToken,

    // Tokens
    Identifier,
    StringLiteral,
    TrueKeyword,
    FalseKeyword,
    EqualsToken,
    PlusEqualsToken,
    PlusToken,
    OpenBracketToken,
    CloseBracketToken,
    OpenBraceToken,
    CloseBraceToken,
    ColonToken,
    CommaToken,

    // Nodes
    SourceFile,
    Assignment,
    ModuleDefinition,
    Property,
    ListExpression,
    ConcatExpression,
    VariableReference,
    BoolLiteral,
}

impl SyntaxKind {
    /// The literal text for punctuation tokens.
    pub fn punctuation_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::EqualsToken => Some("="),
            SyntaxKind::PlusEqualsToken => Some("+="),
            SyntaxKind::PlusToken => Some("+"),
            SyntaxKind::OpenBracketToken => Some("["),
            SyntaxKind::CloseBracketToken => Some("]"),
            SyntaxKind::OpenBraceToken => Some("{"),
            SyntaxKind::CloseBraceToken => Some("}"),
            SyntaxKind::ColonToken => Some(":"),
            SyntaxKind::CommaToken => Some(","),
            _ => None,
        }
    }

    /// The literal text for keyword tokens.
    pub fn keyword_text(self) -> Option<&'static str> {
        match self {
            SyntaxKind::TrueKeyword => Some("true"),
            SyntaxKind::FalseKeyword => Some("false"),
            _ => None,
        }
    }

    /// Map identifier text to a keyword kind, if it is one.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "true" => Some(SyntaxKind::TrueKeyword),
            "false" => Some(SyntaxKind::FalseKeyword),
            _ => None,
        }
    }

    /// Whether this kind can start an expression.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::StringLiteral
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::OpenBracketToken
        )
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.punctuation_text().or_else(|| self.keyword_text()) {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "{:?}", self),
        }
    }
}
