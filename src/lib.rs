//! Front end for a small C-like language.
//!
//! The pipeline turns source text into tokens, a syntax tree, a scope tree
//! with unused-variable warnings, a control-flow graph of `main`, and a coarse
//! complexity estimate. Diagnostics render through miette.
//!
//! # Example
//!
//! ```
//! use minic_frontend::{CfgNodeKind, ComplexityClass, compile};
//!
//! let result = compile("int main() { int x = 10; return 0; }");
//!
//! assert_eq!(result.scopes[0].name, "main");
//! assert_eq!(result.diagnostics.len(), 1);
//!
//! let graph = result.control_flow.as_ref().unwrap();
//! let kinds: Vec<CfgNodeKind> = graph.nodes().iter().map(|n| n.kind).collect();
//! assert_eq!(
//!     kinds,
//!     [CfgNodeKind::Entry, CfgNodeKind::Statement, CfgNodeKind::Return, CfgNodeKind::Exit]
//! );
//!
//! let complexity = result.complexity.unwrap();
//! assert_eq!(complexity.time.class, ComplexityClass::Constant);
//! ```

pub mod analysis;
pub mod ast;
pub mod cfg;
pub mod config;
pub mod diag;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod semantic;

pub use analysis::{ComplexityClass, ComplexityInfo, estimate_complexity};
pub use ast::{NodeId, Position, Span, SyntaxKind, SyntaxNode, SyntaxTree};
pub use cfg::{CfgNodeId, CfgNodeKind, ControlFlowGraph, ControlFlowNode, build_cfg};
pub use config::CompilerConfig;
pub use diag::{Diag, DiagSeverity, SourceFile};
pub use error::PipelineError;
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};
pub use parser::{Parser, parse};
pub use pipeline::{CompilationResult, compile, compile_with_config};
pub use semantic::{Scope, ScopeKind, VariableInfo, resolve_scopes};
