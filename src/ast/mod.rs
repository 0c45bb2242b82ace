//! Syntax tree foundation types and node structures.

pub mod node;
mod span;

// Re-export span types
pub use span::{Position, Span};

// Re-export tree structure
pub use node::{Descendants, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
