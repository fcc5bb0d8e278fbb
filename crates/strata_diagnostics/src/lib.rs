//! strata_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Defines every diagnostic the strata pipeline can produce. Evaluation
//! messages are stable templates: external consumers (test harnesses, the
//! surrounding build tool) match against these strings, so their wording,
//! punctuation, and the embedded `+=` token are load-bearing.

use std::fmt;
use strata_core::text::SourceLocation;

/// Diagnostic severity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic error code (e.g., 1101, 2003).
    pub code: u32,
    /// The category of this diagnostic.
    pub category: DiagnosticCategory,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Where this diagnostic occurred, if known.
    pub location: Option<SourceLocation>,
    /// The resolved message text.
    pub message_text: String,
    /// The diagnostic error code.
    pub code: u32,
    /// The category.
    pub category: DiagnosticCategory,
    /// Related diagnostics (e.g., the previous assignment of a variable).
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Create a new diagnostic at a source location.
    pub fn with_location(
        location: SourceLocation,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            location: Some(location),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Add related diagnostic information.
    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    /// The location of the first related diagnostic, if any.
    pub fn related_location(&self) -> Option<&SourceLocation> {
        self.related_information
            .first()
            .and_then(|d| d.location.as_ref())
    }

    /// Whether this is an error diagnostic.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref location) = self.location {
            write!(f, "{}: ", location)?;
        }
        write!(f, "{} ST{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A collection of diagnostics accumulated during a run.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Sort diagnostics by file, then line, then column.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            let key = |d: &Diagnostic| {
                d.location
                    .as_ref()
                    .map(|l| (l.file.clone(), l.line, l.column))
            };
            key(a).cmp(&key(b))
        });
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Scanner errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_STRING_LITERAL: DiagnosticMessage = diag!(1001, Error, "Unterminated string literal.");
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1002, Error, "'*/' expected.");
    pub const INVALID_CHARACTER: DiagnosticMessage = diag!(1003, Error, "Invalid character.");
    pub const INVALID_ESCAPE_SEQUENCE: DiagnosticMessage = diag!(1004, Error, "Invalid escape sequence.");
    pub const STRING_LITERAL_MUST_BE_SINGLE_LINE: DiagnosticMessage = diag!(1005, Error, "String literal must not contain a line break.");

    // ========================================================================
    // Parser errors (1100-1199)
    // ========================================================================
    pub const _0_EXPECTED: DiagnosticMessage = diag!(1101, Error, "'{0}' expected.");
    pub const IDENTIFIER_EXPECTED: DiagnosticMessage = diag!(1102, Error, "Identifier expected.");
    pub const EXPRESSION_EXPECTED: DiagnosticMessage = diag!(1103, Error, "Expression expected.");
    pub const STATEMENT_EXPECTED: DiagnosticMessage = diag!(1104, Error, "Statement expected.");
    pub const PROPERTY_ASSIGNMENT_EXPECTED: DiagnosticMessage = diag!(1105, Error, "Property assignment expected.");
    pub const DUPLICATE_PROPERTY_0: DiagnosticMessage = diag!(1106, Error, "Duplicate property '{0}'.");
    pub const ASSIGNMENT_OR_MODULE_EXPECTED: DiagnosticMessage = diag!(1107, Error, "Variable assignment or module definition expected.");

    // ========================================================================
    // Evaluation errors (2000-2099)
    //
    // These templates are matched verbatim by downstream consumers. Do not
    // reword, recapitalize, or repunctuate them.
    // ========================================================================
    pub const UNDEFINED_VARIABLE_0: DiagnosticMessage = diag!(2001, Error, "undefined variable {0}");
    pub const MODIFIED_NON_EXISTENT_VARIABLE_0: DiagnosticMessage = diag!(2002, Error, "modified non-existent variable \"{0}\" with +=");
    pub const VARIABLE_ALREADY_SET_0: DiagnosticMessage = diag!(2003, Error, "variable already set, previous assignment: {0}");
    pub const VARIABLE_ALREADY_SET_IN_INHERITED_SCOPE_0: DiagnosticMessage = diag!(2004, Error, "variable already set in inherited scope, previous assignment: {0}");
    pub const MODIFIED_NON_LOCAL_VARIABLE_0: DiagnosticMessage = diag!(2005, Error, "modified non-local variable \"{0}\" with +=");
    pub const MODIFIED_VARIABLE_0_AFTER_REFERENCING: DiagnosticMessage = diag!(2006, Error, "modified variable \"{0}\" with += after referencing");
    pub const OPERATOR_PLUS_CANNOT_BE_APPLIED_TO_TYPES_0_AND_1: DiagnosticMessage = diag!(2007, Error, "operator + cannot be applied to types {0} and {1}");

    // ========================================================================
    // Module errors (2100-2199)
    // ========================================================================
    pub const UNRECOGNIZED_MODULE_TYPE_0: DiagnosticMessage = diag!(2101, Error, "unrecognized module type \"{0}\"");
    pub const PREVIOUS_ASSIGNMENT: DiagnosticMessage = diag!(2190, Warning, "previous assignment of '{0}'");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message("undefined variable {0}", &["foo"]),
            "undefined variable foo"
        );
        assert_eq!(
            format_message("operator + cannot be applied to types {0} and {1}", &["string", "list"]),
            "operator + cannot be applied to types string and list"
        );
    }

    #[test]
    fn test_display_with_location() {
        let loc = SourceLocation::new("Strata.build", 2, 1);
        let d = Diagnostic::with_location(loc, &messages::UNDEFINED_VARIABLE_0, &["foo"]);
        assert_eq!(
            d.to_string(),
            "Strata.build:2:1: error ST2001: undefined variable foo"
        );
    }

    #[test]
    fn test_related_location() {
        let here = SourceLocation::new("sub/Strata.build", 2, 1);
        let there = SourceLocation::new("Strata.build", 2, 1);
        let rendered = there.to_string();
        let d = Diagnostic::with_location(
            here,
            &messages::VARIABLE_ALREADY_SET_IN_INHERITED_SCOPE_0,
            &[rendered.as_str()],
        )
        .with_related(Diagnostic::with_location(
            there.clone(),
            &messages::PREVIOUS_ASSIGNMENT,
            &["foo"],
        ));
        assert_eq!(d.related_location(), Some(&there));
        assert!(d.message_text.starts_with("variable already set in inherited scope, previous assignment:"));
    }

    #[test]
    fn test_collection_sort() {
        let mut collection = DiagnosticCollection::new();
        collection.add(Diagnostic::with_location(
            SourceLocation::new("b/Strata.build", 1, 1),
            &messages::UNDEFINED_VARIABLE_0,
            &["x"],
        ));
        collection.add(Diagnostic::with_location(
            SourceLocation::new("a/Strata.build", 3, 1),
            &messages::UNDEFINED_VARIABLE_0,
            &["y"],
        ));
        collection.sort();
        assert_eq!(
            collection.diagnostics()[0].location.as_ref().unwrap().file,
            "a/Strata.build"
        );
        assert_eq!(collection.error_count(), 2);
    }
}
