//! Syntax tree nodes stored in a per-parse arena.
//!
//! Every node is owned by the [`SyntaxTree`] that produced it and is addressed
//! by a [`NodeId`]. Ids are dense indices assigned in allocation order, and the
//! parser allocates a parent before any of its children, so ids increase along
//! a pre-order walk and are identical across repeated parses of the same input.

use std::fmt;

use smol_str::SmolStr;

use crate::ast::{Position, Span};
use crate::error::PipelineError;
use crate::lexer::token::TokenKind;

/// Stable identifier of a syntax node within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a node id from a raw arena index.
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw arena index.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    Program,
    FunctionDeclaration,
    Type,
    Identifier,
    Parameters,
    Parameter,
    FunctionBody,
    VariableDeclaration,
    IfStatement,
    Condition,
    IfBody,
    Else,
    FunctionCall,
    Arguments,
    Return,
    Expression,
    ForStatement,
    WhileStatement,
    LoopBody,
    Assignment,
    /// A raw token carried verbatim, e.g. inside a condition or expression.
    Leaf(TokenKind),
}

impl SyntaxKind {
    /// Returns the upper-case display name of this kind. Raw token leaves
    /// carry a `(leaf)` suffix after their token kind.
    pub fn name(&self) -> &'static str {
        match self {
            SyntaxKind::Program => "PROGRAM",
            SyntaxKind::FunctionDeclaration => "FUNCTION_DECLARATION",
            SyntaxKind::Type => "TYPE",
            SyntaxKind::Identifier => "IDENTIFIER",
            SyntaxKind::Parameters => "PARAMETERS",
            SyntaxKind::Parameter => "PARAMETER",
            SyntaxKind::FunctionBody => "FUNCTION_BODY",
            SyntaxKind::VariableDeclaration => "VARIABLE_DECLARATION",
            SyntaxKind::IfStatement => "IF_STATEMENT",
            SyntaxKind::Condition => "CONDITION",
            SyntaxKind::IfBody => "IF_BODY",
            SyntaxKind::Else => "ELSE",
            SyntaxKind::FunctionCall => "FUNCTION_CALL",
            SyntaxKind::Arguments => "ARGUMENTS",
            SyntaxKind::Return => "RETURN",
            SyntaxKind::Expression => "EXPRESSION",
            SyntaxKind::ForStatement => "FOR_STATEMENT",
            SyntaxKind::WhileStatement => "WHILE_STATEMENT",
            SyntaxKind::LoopBody => "LOOP_BODY",
            SyntaxKind::Assignment => "ASSIGNMENT",
            SyntaxKind::Leaf(kind) => match kind {
                TokenKind::Keyword => "KEYWORD(leaf)",
                TokenKind::Identifier => "IDENTIFIER(leaf)",
                TokenKind::String => "STRING(leaf)",
                TokenKind::Number => "NUMBER(leaf)",
                TokenKind::Operator => "OPERATOR(leaf)",
                TokenKind::Punctuation => "PUNCTUATION(leaf)",
                TokenKind::Error => "ERROR(leaf)",
            },
        }
    }

    /// Returns true for `for` and `while` statements.
    pub fn is_loop(&self) -> bool {
        matches!(self, SyntaxKind::ForStatement | SyntaxKind::WhileStatement)
    }

    /// Returns true for block nodes that open a nested lexical scope.
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            SyntaxKind::IfBody | SyntaxKind::Else | SyntaxKind::LoopBody
        )
    }

    /// Returns true for raw token leaves.
    pub fn is_leaf(&self) -> bool {
        matches!(self, SyntaxKind::Leaf(_))
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Arena id of this node.
    pub id: NodeId,
    /// Node kind.
    pub kind: SyntaxKind,
    /// Literal value: token text for leaves, the name for functions and calls,
    /// the operator for assignments.
    pub value: Option<SmolStr>,
    /// Ordered child ids.
    pub children: Vec<NodeId>,
    /// Position of the first token covered by this node.
    pub start: Position,
    /// Position of the last token covered by this node.
    pub end: Position,
    /// Byte range covered by this node.
    pub span: Span,
}

impl SyntaxNode {
    /// Returns the literal value, or an empty string when there is none.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// An arena-backed syntax tree rooted at a PROGRAM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: NodeId,
}

impl SyntaxTree {
    /// Returns the PROGRAM root node.
    pub fn root(&self) -> &SyntaxNode {
        &self.nodes[self.root.0]
    }

    /// Returns the root id.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Returns the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the tree holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.0)
    }

    /// Looks up a node by id, failing with [`PipelineError::InvalidNode`].
    pub fn node(&self, id: NodeId) -> Result<&SyntaxNode, PipelineError> {
        self.get(id)
            .ok_or(PipelineError::InvalidNode { id: id.as_usize() })
    }

    /// Returns all nodes in id order.
    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    /// Iterates over the direct children of `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &SyntaxNode> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.get(*child))
    }

    /// Returns the first direct child of `id` with the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children(id).find(|child| child.kind == kind)
    }

    /// Iterates over `id` and all of its descendants in pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Iterates over the FUNCTION_DECLARATION children of the root.
    pub fn functions(&self) -> impl Iterator<Item = &SyntaxNode> + '_ {
        self.children(self.root)
            .filter(|node| node.kind == SyntaxKind::FunctionDeclaration)
    }

    /// Finds the function declaration with the given name.
    pub fn find_function(&self, name: &str) -> Option<&SyntaxNode> {
        self.functions().find(|node| node.text() == name)
    }

    /// Joins the text of every leaf below `id` with single spaces.
    pub fn leaf_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter(|node| node.kind.is_leaf())
            .map(SyntaxNode::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders the tree as an indented outline, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_into(self.root, 0, &mut out);
        out
    }

    fn outline_into(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.kind.name());
        if let Some(value) = &node.value {
            out.push_str(" \"");
            out.push_str(value);
            out.push('"');
        }
        out.push('\n');
        for child in &node.children {
            self.outline_into(*child, depth + 1, out);
        }
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if let Some(node) = self.tree.get(id) {
                self.stack.extend(node.children.iter().rev().copied());
                return Some(node);
            }
        }
        None
    }
}

/// Incremental builder used by the parser to allocate nodes.
#[derive(Debug, Default)]
pub(crate) struct TreeBuilder {
    nodes: Vec<SyntaxNode>,
}

impl TreeBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocates a childless node whose extent is a single position.
    pub(crate) fn alloc(
        &mut self,
        kind: SyntaxKind,
        value: Option<SmolStr>,
        start: Position,
        span: Span,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            id,
            kind,
            value,
            children: Vec::new(),
            start,
            end: start,
            span,
        });
        id
    }

    /// Appends `child` to the children of `parent`.
    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    /// Extends the node's extent to end at `end`, covering bytes up to `span_end`.
    pub(crate) fn close(&mut self, id: NodeId, end: Position, span_end: usize) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.end = end;
            node.span.end = span_end.max(node.span.start);
        }
    }

    pub(crate) fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}
