//! Structural parser for the C-like source language.
//!
//! The parser consumes the lexer's token sequence and builds a [`SyntaxTree`]
//! rooted at a PROGRAM node. The grammar is deliberately partial: tokens that
//! start no recognized construct are skipped one at a time and never produce a
//! diagnostic. The only failure is exceeding the configured block nesting
//! depth, which would otherwise exhaust the stack.

pub mod base;
mod program;
mod statements;

use smol_str::SmolStr;

use crate::ast::node::TreeBuilder;
use crate::ast::{NodeId, SyntaxKind, SyntaxTree};
use crate::error::PipelineError;
use crate::lexer::token::Token;
use base::TokenCursor;

/// Block nesting limit used by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Recursive-descent parser with an explicit cursor.
pub struct Parser<'t> {
    cursor: TokenCursor<'t>,
    builder: TreeBuilder,
    max_depth: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    /// Creates a new parser over a token sequence.
    pub fn new(tokens: &'t [Token]) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            builder: TreeBuilder::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
        }
    }

    /// Sets the block nesting limit.
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }

    /// Parses the token sequence into a syntax tree.
    pub fn parse(mut self) -> Result<SyntaxTree, PipelineError> {
        let root = self.parse_program()?;
        Ok(self.builder.finish(root))
    }

    /// Allocates a `kind` node starting at `token`.
    fn open(&mut self, kind: SyntaxKind, value: Option<SmolStr>, token: &Token) -> NodeId {
        self.builder
            .alloc(kind, value, token.position(), token.span.clone())
    }

    /// Closes `id` at the most recently consumed token.
    fn close(&mut self, id: NodeId) {
        let (end, span_end) = self.cursor.previous_end();
        self.builder.close(id, end, span_end);
    }

    /// Closes `id` at `token`.
    fn close_at(&mut self, id: NodeId, token: &Token) {
        self.builder
            .close(id, token.end_position(), token.span.end);
    }

    /// Allocates a node of `kind` carrying `token`'s text.
    fn leaf_as(&mut self, kind: SyntaxKind, token: &Token) -> NodeId {
        let id = self.open(kind, Some(token.text.clone()), token);
        self.close_at(id, token);
        id
    }

    /// Allocates a raw token leaf.
    fn leaf(&mut self, token: &Token) -> NodeId {
        self.leaf_as(SyntaxKind::Leaf(token.kind), token)
    }

    /// Allocates a `kind` node holding `tokens` verbatim as leaves, spanning
    /// from `anchor` to `closer`.
    fn raw_node(
        &mut self,
        kind: SyntaxKind,
        anchor: &Token,
        tokens: &[Token],
        closer: &Token,
    ) -> NodeId {
        let node = self.open(kind, None, anchor);
        for token in tokens {
            let leaf = self.leaf(token);
            self.builder.push_child(node, leaf);
        }
        self.close_at(node, closer);
        node
    }

    /// Allocates an EXPRESSION node, or nothing for an empty token run.
    fn expression(&mut self, tokens: &[Token]) -> Option<NodeId> {
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(self.raw_node(SyntaxKind::Expression, first, tokens, last))
    }

    /// Records entry into a nested block.
    fn enter(&mut self, token: &Token) -> Result<(), PipelineError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(PipelineError::NestingTooDeep {
                depth: self.depth,
                limit: self.max_depth,
                line: token.line,
                column: token.column,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Parses a token sequence with the default nesting limit.
pub fn parse(tokens: &[Token]) -> Result<SyntaxTree, PipelineError> {
    Parser::new(tokens).parse()
}
