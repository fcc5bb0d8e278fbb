//! The strata scanner.
//!
//! Converts description-file text into a stream of tokens for the parser.
//! Trivia (`//` and `/* */` comments, whitespace) is skipped between tokens.

use strata_ast::syntax_kind::SyntaxKind;
use strata_core::text::{LineMap, SourceLocation};
use strata_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};

/// The scanner converts strata source text into tokens.
pub struct Scanner {
    /// The description file path, for diagnostic locations.
    file_name: String,
    /// The source text being scanned.
    text: Vec<char>,
    /// Byte offset of each character; one extra entry for the text end.
    offsets: Vec<u32>,
    /// Current position in the text (character index).
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    /// The current token kind.
    token: SyntaxKind,
    /// The text of the current token (decoded, for strings).
    token_value: String,
    /// Offset-to-line conversion for this file.
    line_map: LineMap,
    /// Accumulated diagnostics.
    diagnostics: DiagnosticCollection,
}

impl Scanner {
    /// Create a new scanner for the given source text.
    pub fn new(file_name: &str, text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (i, ch) in text.char_indices() {
            offsets.push(i as u32);
            chars.push(ch);
        }
        offsets.push(text.len() as u32);
        Self {
            file_name: file_name.to_string(),
            text: chars,
            offsets,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            line_map: LineMap::new(text),
            diagnostics: DiagnosticCollection::new(),
        }
    }

    /// Get the current token kind.
    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Get the current token's text value.
    #[inline]
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Byte offset of the start of the current token (after trivia).
    #[inline]
    pub fn token_start(&self) -> u32 {
        self.offsets[self.token_start]
    }

    /// Byte offset just past the current token.
    #[inline]
    pub fn token_end(&self) -> u32 {
        self.offsets[self.pos]
    }

    /// The line map for the file being scanned.
    pub fn line_map(&self) -> &LineMap {
        &self.line_map
    }

    /// Get the accumulated diagnostics.
    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Scan the next token, returning its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_value.clear();
        self.skip_trivia();
        self.token_start = self.pos;

        if self.is_eof() {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        }

        let ch = self.text[self.pos];
        self.token = match ch {
            '=' => {
                self.pos += 1;
                SyntaxKind::EqualsToken
            }
            '+' => {
                self.pos += 1;
                if self.current() == Some('=') {
                    self.pos += 1;
                    SyntaxKind::PlusEqualsToken
                } else {
                    SyntaxKind::PlusToken
                }
            }
            '[' => {
                self.pos += 1;
                SyntaxKind::OpenBracketToken
            }
            ']' => {
                self.pos += 1;
                SyntaxKind::CloseBracketToken
            }
            '{' => {
                self.pos += 1;
                SyntaxKind::OpenBraceToken
            }
            '}' => {
                self.pos += 1;
                SyntaxKind::CloseBraceToken
            }
            ':' => {
                self.pos += 1;
                SyntaxKind::ColonToken
            }
            ',' => {
                self.pos += 1;
                SyntaxKind::CommaToken
            }
            '"' => self.scan_string(),
            c if is_identifier_start(c) => self.scan_identifier(),
            _ => {
                self.error_at(self.pos, &messages::INVALID_CHARACTER, &[]);
                self.pos += 1;
                SyntaxKind::Unknown
            }
        };
        self.token
    }

    // ========================================================================
    // Trivia
    // ========================================================================

    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                Some(c) if c.is_whitespace() => {
                    self.pos += 1;
                }
                Some('/') if self.peek(1) == Some('/') => {
                    while !self.is_eof() && self.text[self.pos] != '\n' {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek(1) == Some('*') => {
                    let comment_start = self.pos;
                    self.pos += 2;
                    loop {
                        if self.is_eof() {
                            self.error_at(comment_start, &messages::UNTERMINATED_COMMENT, &[]);
                            break;
                        }
                        if self.text[self.pos] == '*' && self.peek(1) == Some('/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    // ========================================================================
    // Literals and identifiers
    // ========================================================================

    fn scan_string(&mut self) -> SyntaxKind {
        let quote_pos = self.pos;
        self.pos += 1; // opening quote
        loop {
            match self.current() {
                None => {
                    self.error_at(quote_pos, &messages::UNTERMINATED_STRING_LITERAL, &[]);
                    break;
                }
                Some('"') => {
                    self.pos += 1;
                    break;
                }
                Some('\n') => {
                    self.error_at(self.pos, &messages::STRING_LITERAL_MUST_BE_SINGLE_LINE, &[]);
                    break;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.current() {
                        Some('n') => self.token_value.push('\n'),
                        Some('t') => self.token_value.push('\t'),
                        Some('\\') => self.token_value.push('\\'),
                        Some('"') => self.token_value.push('"'),
                        _ => {
                            self.error_at(self.pos - 1, &messages::INVALID_ESCAPE_SEQUENCE, &[]);
                        }
                    }
                    if !self.is_eof() {
                        self.pos += 1;
                    }
                }
                Some(c) => {
                    self.token_value.push(c);
                    self.pos += 1;
                }
            }
        }
        SyntaxKind::StringLiteral
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        while let Some(c) = self.current() {
            if !is_identifier_part(c) {
                break;
            }
            self.token_value.push(c);
            self.pos += 1;
        }
        SyntaxKind::from_keyword(&self.token_value).unwrap_or(SyntaxKind::Identifier)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    #[inline]
    fn is_eof(&self) -> bool {
        self.pos >= self.text.len()
    }

    #[inline]
    fn current(&self) -> Option<char> {
        self.text.get(self.pos).copied()
    }

    #[inline]
    fn peek(&self, n: usize) -> Option<char> {
        self.text.get(self.pos + n).copied()
    }

    fn error_at(&mut self, pos: usize, message: &DiagnosticMessage, args: &[&str]) {
        let location =
            SourceLocation::resolve(&self.file_name, &self.line_map, self.offsets[pos]);
        self.diagnostics
            .add(Diagnostic::with_location(location, message, args));
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}
