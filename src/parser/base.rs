//! Shared parser infrastructure for token stream navigation.
//!
//! The cursor owns the only mutable position in the parser. Shape recognizers
//! look ahead through [`TokenCursor::at`] with explicit indices and commit by
//! calling [`TokenCursor::set_position`] once a construct is confirmed.

use crate::ast::Position;
use crate::lexer::token::{Token, TokenKind};

/// Token stream navigator with explicit position state.
///
/// Parenthesis pairs and expression ends are computed once up front, so shape
/// lookahead never rescans the stream. Braces never occur inside a condition
/// or an expression, so both tables stop at the nearest `{` or `}`.
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Index of the `)` matching each `(`.
    closers: Vec<Option<usize>>,
    /// End of an expression starting at each index, plus one slot for the
    /// end of input.
    expression_ends: Vec<usize>,
}

impl<'a> TokenCursor<'a> {
    /// Creates a new cursor at the first token.
    pub fn new(tokens: &'a [Token]) -> Self {
        let closers = paren_pairs(tokens);
        let expression_ends = expression_ends(tokens, &closers);
        Self {
            tokens,
            pos: 0,
            closers,
            expression_ends,
        }
    }

    /// Returns the current token, or `None` at the end of input.
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Returns the token `offset` positions ahead of the current one.
    pub fn peek(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    /// Returns the token at an absolute index.
    pub fn at(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index)
    }

    /// Returns the tokens in `range`, clamped to the stream.
    pub fn slice(&self, range: std::ops::Range<usize>) -> &'a [Token] {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        &self.tokens[start..end]
    }

    /// Advances to the next token. Does nothing at the end of input.
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    /// Returns true once every token has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Returns true if the current token is the punctuation `text`.
    pub fn check_punct(&self, text: &str) -> bool {
        self.current().is_some_and(|token| token.is_punct(text))
    }

    /// Returns true if the current token is the keyword `text`.
    pub fn check_keyword(&self, text: &str) -> bool {
        self.current().is_some_and(|token| token.is_keyword(text))
    }

    /// Returns true if the token at `index` has the given kind.
    pub fn kind_at(&self, index: usize, kind: TokenKind) -> bool {
        self.at(index).is_some_and(|token| token.kind == kind)
    }

    /// Returns true if the token at `index` is the punctuation `text`.
    pub fn punct_at(&self, index: usize, text: &str) -> bool {
        self.at(index).is_some_and(|token| token.is_punct(text))
    }

    /// Consumes the current token if it is the punctuation `text`.
    pub fn consume_punct(&mut self, text: &str) -> bool {
        if self.check_punct(text) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Returns the current position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Sets the position in the token stream.
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    /// Returns the most recently consumed token.
    pub fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|index| self.tokens.get(index))
    }

    /// Returns the end position and end byte of the most recently consumed
    /// token, falling back to the start of input.
    pub fn previous_end(&self) -> (Position, usize) {
        self.previous()
            .map_or((Position::start(), 0), |token| {
                (token.end_position(), token.span.end)
            })
    }

    /// Finds the index of the `)` matching the `(` at `open`.
    ///
    /// Returns `None` if `open` is not `(` or the parenthesis is not closed
    /// before the next brace.
    pub fn matching_paren(&self, open: usize) -> Option<usize> {
        self.closers.get(open).copied().flatten()
    }

    /// Finds where an expression starting at `start` ends: the first `;`, `)`
    /// or `,` outside of any parentheses the expression opened itself.
    ///
    /// Returns the index of the terminator, of the next brace if the
    /// expression leaves a parenthesis open or runs into one, or the token
    /// count if input ends first.
    pub fn expression_end(&self, start: usize) -> usize {
        self.expression_ends
            .get(start)
            .copied()
            .unwrap_or(self.tokens.len())
    }
}

fn is_brace(token: &Token) -> bool {
    token.is_punct("{") || token.is_punct("}")
}

fn paren_pairs(tokens: &[Token]) -> Vec<Option<usize>> {
    let mut closers = vec![None; tokens.len()];
    let mut open = Vec::new();
    for (index, token) in tokens.iter().enumerate() {
        if token.is_punct("(") {
            open.push(index);
        } else if token.is_punct(")") {
            if let Some(start) = open.pop() {
                closers[start] = Some(index);
            }
        } else if is_brace(token) {
            open.clear();
        }
    }
    closers
}

fn expression_ends(tokens: &[Token], closers: &[Option<usize>]) -> Vec<usize> {
    let len = tokens.len();
    let mut ends = vec![len; len + 1];
    let mut next_brace = len;
    for (index, token) in tokens.iter().enumerate().rev() {
        ends[index] = if is_brace(token) {
            next_brace = index;
            index
        } else if token.is_punct(")") || token.is_punct(";") || token.is_punct(",") {
            index
        } else if token.is_punct("(") {
            match closers[index] {
                Some(close) => ends[close + 1],
                None => next_brace,
            }
        } else {
            ends[index + 1]
        };
    }
    ends
}
