//! Scanner integration tests.
//!
//! Verifies tokenization of description-file text: identifiers, literals,
//! operators, trivia, and scan-time diagnostics.

use strata_ast::syntax_kind::SyntaxKind;
use strata_scanner::Scanner;

/// Helper: scan all tokens in source, excluding the EOF token.
fn scan_kinds(source: &str) -> Vec<SyntaxKind> {
    let mut scanner = Scanner::new("test/Strata.build", source);
    let mut kinds = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        kinds.push(kind);
    }
    kinds
}

/// Helper: scan and return (kind, value) pairs.
fn scan_values(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = Scanner::new("test/Strata.build", source);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        tokens.push((kind, scanner.token_value().to_string()));
    }
    tokens
}

/// Helper: scan everything and return the diagnostic messages.
fn scan_errors(source: &str) -> Vec<String> {
    let mut scanner = Scanner::new("test/Strata.build", source);
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    scanner
        .diagnostics()
        .diagnostics()
        .iter()
        .map(|d| d.message_text.clone())
        .collect()
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_scan_empty() {
    assert_eq!(scan_kinds(""), vec![]);
    assert_eq!(scan_kinds("   \n\t  "), vec![]);
}

#[test]
fn test_scan_assignment() {
    assert_eq!(
        scan_kinds("srcs = \"main.c\""),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::StringLiteral,
        ]
    );
}

#[test]
fn test_scan_append_operator() {
    assert_eq!(
        scan_kinds("srcs += x"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::PlusEqualsToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_scan_plus_vs_plus_equals() {
    assert_eq!(
        scan_kinds("a + b += c"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::PlusToken,
            SyntaxKind::Identifier,
            SyntaxKind::PlusEqualsToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_scan_list_tokens() {
    assert_eq!(
        scan_kinds("[\"a\", \"b\",]"),
        vec![
            SyntaxKind::OpenBracketToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::CommaToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::CommaToken,
            SyntaxKind::CloseBracketToken,
        ]
    );
}

#[test]
fn test_scan_module_tokens() {
    assert_eq!(
        scan_kinds("library { name: \"z\" }"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::OpenBraceToken,
            SyntaxKind::Identifier,
            SyntaxKind::ColonToken,
            SyntaxKind::StringLiteral,
            SyntaxKind::CloseBraceToken,
        ]
    );
}

#[test]
fn test_scan_booleans() {
    assert_eq!(
        scan_kinds("enabled = true\ndisabled = false"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::TrueKeyword,
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::FalseKeyword,
        ]
    );
}

#[test]
fn test_keyword_prefix_is_identifier() {
    // "truely" must not lex as the `true` keyword.
    assert_eq!(scan_kinds("truely"), vec![SyntaxKind::Identifier]);
}

// ============================================================================
// String literals
// ============================================================================

#[test]
fn test_string_value_decoded() {
    let tokens = scan_values(r#"x = "hello world""#);
    assert_eq!(tokens[2], (SyntaxKind::StringLiteral, "hello world".to_string()));
}

#[test]
fn test_string_escapes() {
    let tokens = scan_values(r#"x = "a\tb\n\"q\"\\""#);
    assert_eq!(tokens[2].1, "a\tb\n\"q\"\\");
}

#[test]
fn test_unterminated_string() {
    let errors = scan_errors("x = \"abc");
    assert_eq!(errors, vec!["Unterminated string literal.".to_string()]);
}

#[test]
fn test_multiline_string_rejected() {
    let errors = scan_errors("x = \"abc\ndef\"");
    assert_eq!(errors[0], "String literal must not contain a line break.");
}

// ============================================================================
// Trivia and diagnostics
// ============================================================================

#[test]
fn test_line_comment_skipped() {
    assert_eq!(
        scan_kinds("// a comment\nx = true"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::TrueKeyword,
        ]
    );
}

#[test]
fn test_block_comment_skipped() {
    assert_eq!(
        scan_kinds("x /* inline */ = true"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::EqualsToken,
            SyntaxKind::TrueKeyword,
        ]
    );
}

#[test]
fn test_unterminated_block_comment() {
    let errors = scan_errors("x = true /* never closed");
    assert_eq!(errors, vec!["'*/' expected.".to_string()]);
}

#[test]
fn test_invalid_character() {
    let errors = scan_errors("x = $");
    assert_eq!(errors, vec!["Invalid character.".to_string()]);
}

#[test]
fn test_token_positions_are_byte_offsets() {
    let mut scanner = Scanner::new("test/Strata.build", "ab = \"x\"");
    scanner.scan();
    assert_eq!(scanner.token_start(), 0);
    assert_eq!(scanner.token_end(), 2);
    scanner.scan();
    assert_eq!(scanner.token_start(), 3);
    scanner.scan();
    assert_eq!(scanner.token_start(), 5);
    assert_eq!(scanner.token_end(), 8);
}

#[test]
fn test_error_locations() {
    let mut scanner = Scanner::new("test/Strata.build", "x = true\ny = \"abc");
    while scanner.scan() != SyntaxKind::EndOfFileToken {}
    let diags = scanner.diagnostics().diagnostics();
    assert_eq!(diags.len(), 1);
    let loc = diags[0].location.as_ref().unwrap();
    assert_eq!((loc.line, loc.column), (2, 5));
}
