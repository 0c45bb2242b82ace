//! Lexical scope analysis for parsed programs.
//!
//! The resolver turns a [`SyntaxTree`](crate::ast::SyntaxTree) into a forest
//! of [`Scope`]s, one root per function, and reports variables that are never
//! used.
//!
//! # Example
//!
//! ```
//! use minic_frontend::config::CompilerConfig;
//! use minic_frontend::semantic::resolve_scopes;
//! use minic_frontend::{parse, tokenize};
//!
//! let tokens = tokenize("int main() { int x = 10; return 0; }").tokens;
//! let tree = parse(&tokens).unwrap();
//! let resolution = resolve_scopes(&tree, &CompilerConfig::default()).unwrap();
//!
//! assert_eq!(resolution.scopes[0].name, "main");
//! assert_eq!(resolution.diagnostics.len(), 1);
//! ```

pub mod resolver;
pub mod scope;

pub use resolver::{ScopeResolution, ScopeResolver, resolve_scopes};
pub use scope::{Scope, ScopeKind, ScopeWalk, VariableInfo};
