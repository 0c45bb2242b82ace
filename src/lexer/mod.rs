//! Lexical analysis for the C-like source language.
//!
//! The lexer converts source text into an ordered token sequence that covers
//! the whole input with no gaps and no overlaps. Classification is table driven
//! through a `logos` classifier: at each position the longest match wins and
//! multi-character operators beat their single-character prefixes. A matched
//! identifier is reclassified as a keyword when [`keywords::is_keyword`] says so.
//!
//! Whitespace and `//` comments are trivia: they are consumed and recorded but
//! never emitted as tokens. A character no classifier accepts becomes a
//! one-character [`TokenKind::Error`] token, so scanning always advances and
//! always terminates.

pub mod keywords;
pub mod token;

use logos::Logos;

use crate::ast::{Position, Span};
use crate::diag::Diag;
use token::{Token, TokenKind};

/// Raw classifier table driving the scanner.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    String,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("++")]
    #[token("--")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("->")]
    #[token("<<")]
    #[token(">>")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("=")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("?")]
    #[token(":")]
    #[token(".")]
    Operator,

    #[token(";")]
    #[token(",")]
    #[token("(")]
    #[token(")")]
    #[token("{")]
    #[token("}")]
    #[token("[")]
    #[token("]")]
    Punctuation,
}

impl Lexeme {
    /// Maps an emitted lexeme to its public kind; trivia maps to `None`.
    fn token_kind(self) -> Option<TokenKind> {
        match self {
            Lexeme::Whitespace | Lexeme::LineComment => None,
            Lexeme::Identifier => Some(TokenKind::Identifier),
            Lexeme::String => Some(TokenKind::String),
            Lexeme::Number => Some(TokenKind::Number),
            Lexeme::Operator => Some(TokenKind::Operator),
            Lexeme::Punctuation => Some(TokenKind::Punctuation),
        }
    }
}

/// Result of lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The emitted tokens in source order.
    pub tokens: Vec<Token>,
    /// Byte spans of the whitespace and comment runs that were skipped.
    pub trivia: Vec<Span>,
}

impl LexerResult {
    /// Returns the tokens no classifier recognized.
    pub fn error_tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.tokens
            .iter()
            .filter(|token| token.kind == TokenKind::Error)
    }

    /// Builds one error diagnostic per unrecognized character.
    pub fn error_diagnostics(&self) -> Vec<Diag> {
        self.error_tokens()
            .map(|token| {
                Diag::error(format!("Unrecognized character '{}'", token.text))
                    .at(token.line, token.column)
                    .with_span(token.span.clone())
                    .with_suggestion(format!("Remove '{}' or replace it", token.text))
                    .with_code("E0001")
            })
            .collect()
    }
}

/// A lexical analyzer for source text.
pub struct Lexer<'a> {
    /// The source text being lexed.
    source: &'a str,
    /// Current byte position in source.
    pos: usize,
    /// Line of the character at `pos`.
    line: usize,
    /// Column of the character at `pos`.
    column: usize,
    /// Accumulated tokens.
    tokens: Vec<Token>,
    /// Accumulated trivia spans.
    trivia: Vec<Span>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            trivia: Vec::new(),
        }
    }

    /// Tokenizes the source text and returns the result.
    pub fn tokenize(mut self) -> LexerResult {
        while !self.is_at_end() {
            self.scan_token();
        }

        tracing::trace!(
            tokens = self.tokens.len(),
            trivia = self.trivia.len(),
            "lexing finished"
        );

        LexerResult {
            tokens: self.tokens,
            trivia: self.trivia,
        }
    }

    /// Classifies and consumes the longest match at the current position.
    fn scan_token(&mut self) {
        let rest = &self.source[self.pos..];
        let mut classifier = Lexeme::lexer(rest);

        let matched = match classifier.next() {
            Some(Ok(lexeme)) if classifier.span().start == 0 && classifier.span().end > 0 => {
                Some((lexeme, classifier.span().end))
            }
            _ => None,
        };

        match matched {
            Some((lexeme, len)) => match lexeme.token_kind() {
                Some(TokenKind::Identifier) if keywords::is_keyword(&rest[..len]) => {
                    self.add_token(TokenKind::Keyword, len)
                }
                Some(kind) => self.add_token(kind, len),
                None => {
                    let start = self.pos;
                    self.consume(len);
                    self.trivia.push(start..self.pos);
                }
            },
            None => {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                self.add_token(TokenKind::Error, len);
            }
        }
    }

    /// Emits a token covering the next `len` bytes and consumes them.
    fn add_token(&mut self, kind: TokenKind, len: usize) {
        let start = self.pos;
        let position = Position::new(self.line, self.column);
        self.consume(len);
        let text = &self.source[start..self.pos];
        self.tokens
            .push(Token::new(kind, text, position, start..self.pos));
    }

    /// Advances over `len` bytes, updating line and column per character.
    fn consume(&mut self, len: usize) {
        let end = (self.pos + len).min(self.source.len());
        for ch in self.source[self.pos..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos = end;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Convenience function to tokenize source text.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
