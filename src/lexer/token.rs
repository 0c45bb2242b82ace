//! Token types and representations for lexical analysis.

use crate::ast::{Position, Span};
use smol_str::SmolStr;
use std::fmt;

/// The classification of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A reserved word such as `int`, `if` or `return`.
    Keyword,
    /// A name that is not a keyword.
    Identifier,
    /// A quoted string or character literal, quotes included.
    String,
    /// An integer or floating-point literal.
    Number,
    /// An arithmetic, comparison, logical or assignment operator.
    Operator,
    /// One of `; , ( ) { } [ ]`.
    Punctuation,
    /// A single character no classifier recognized.
    Error,
}

impl TokenKind {
    /// Returns the upper-case display name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::Error => "ERROR",
        }
    }

    /// Returns true for tokens that may appear as call arguments.
    pub fn is_argument(&self) -> bool {
        matches!(
            self,
            TokenKind::String | TokenKind::Number | TokenKind::Identifier
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token with its source text and location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The exact source text of the token.
    pub text: SmolStr,
    /// Line of the first character, starting at 1.
    pub line: usize,
    /// Column of the first character, starting at 1.
    pub column: usize,
    /// The byte span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(
        kind: TokenKind,
        text: impl Into<SmolStr>,
        position: Position,
        span: Span,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            line: position.line,
            column: position.column,
            span,
        }
    }

    /// Returns the position of the first character.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns the position of the last character.
    ///
    /// Tokens never span lines except string literals, which are scanned to the
    /// next quote and may contain newlines.
    pub fn end_position(&self) -> Position {
        let mut position = self.position();
        let mut chars = self.text.chars().peekable();
        while let Some(ch) = chars.next() {
            if chars.peek().is_none() {
                break;
            }
            if ch == '\n' {
                position.line += 1;
                position.column = 1;
            } else {
                position.column += 1;
            }
        }
        position
    }

    /// Returns true if this token has the given kind and text.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text.as_str() == text
    }

    /// Returns true if this is the punctuation token `text`.
    pub fn is_punct(&self, text: &str) -> bool {
        self.is(TokenKind::Punctuation, text)
    }

    /// Returns true if this is the keyword `text`.
    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}' at {}:{}", self.kind, self.text, self.line, self.column)
    }
}
