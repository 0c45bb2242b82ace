//! Common test utilities
//!
//! Shared helpers used across the integration test files.
//!
//! # Pipeline Helpers
//! - [`compile_cleanly`] - Compile source, panicking on a fatal result
//! - [`format_diag_diagnostics`] - Format diagnostics for assertion messages
//! - [`cfg_kinds`] - Node kinds of a control-flow graph in id order
//!
//! # Generators
//! - [`Lcg`] - Deterministic pseudo-random generator for corpus inputs
//! - [`random_source`] - Random token soup built from a piece table
//! - [`nested_ifs`] / [`nested_loops`] - Deeply nested programs

#![allow(dead_code)]

use minic_frontend::{CfgNodeKind, CompilationResult, ControlFlowGraph, Diag, LexerResult, compile};

// ============================================================================
// Pipeline Helpers
// ============================================================================

/// Installs a test subscriber once, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Format diagnostics for display in assertion messages.
pub fn format_diag_diagnostics(diags: &[Diag]) -> String {
    diags
        .iter()
        .map(|diag| diag.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiles `source` and asserts the pipeline did not fail.
pub fn compile_cleanly(source: &str) -> CompilationResult {
    init_tracing();
    let result = compile(source);
    assert!(
        !result.is_fatal(),
        "Expected a successful compile.\nSource: {source}\nDiagnostics:\n{}",
        format_diag_diagnostics(&result.diagnostics)
    );
    result
}

/// Returns the node kinds of `graph` in id order.
pub fn cfg_kinds(graph: &ControlFlowGraph) -> Vec<CfgNodeKind> {
    graph.nodes().iter().map(|node| node.kind).collect()
}

/// Rebuilds the source from tokens and trivia, asserting that together they
/// tile the input with no gaps or overlaps.
pub fn reconstruct(source: &str, lexed: &LexerResult) -> String {
    let mut spans: Vec<_> = lexed
        .tokens
        .iter()
        .map(|token| token.span.clone())
        .chain(lexed.trivia.iter().cloned())
        .collect();
    spans.sort_by_key(|span| span.start);

    let mut out = String::new();
    let mut cursor = 0;
    for span in spans {
        assert_eq!(
            span.start, cursor,
            "gap or overlap at byte {cursor} in {source:?}"
        );
        out.push_str(&source[span.clone()]);
        cursor = span.end;
    }
    assert_eq!(cursor, source.len(), "input not fully covered: {source:?}");
    out
}

// ============================================================================
// Generators
// ============================================================================

/// Linear congruential generator for deterministic corpora.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    /// Returns a value in `0..bound`.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    pub fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }
}

/// Pieces of C-like source, plus stray characters and separators.
pub const PIECES: &[&str] = &[
    "int", "char", "float", "void", "main", "x", "y", "count", "(", ")", "{", "}", "[", "]",
    ";", ",", "=", "==", "+=", "<", "&&", "++", "if", "else", "for", "while", "return",
    "printf", "0", "42", "3.14", "1e5", "\"text\"", "'c'", "\"open", "@", "#", "$", "é",
    " ", "  ", "\n", "\t", "// note\n", "\r\n",
];

/// Concatenates `count` randomly chosen pieces.
pub fn random_source(rng: &mut Lcg, count: usize) -> String {
    (0..count).map(|_| rng.pick(PIECES)).collect()
}

/// A `main` whose body nests `depth` if-blocks.
pub fn nested_ifs(depth: usize) -> String {
    let mut source = String::from("int main() {\n");
    for level in 0..depth {
        source.push_str(&format!("if (x > {level}) {{\n"));
    }
    source.push_str("x = 0;\n");
    for _ in 0..depth {
        source.push_str("}\n");
    }
    source.push('}');
    source
}

/// A `main` whose body nests `depth` for-loops.
pub fn nested_loops(depth: usize) -> String {
    let mut source = String::from("int main() {\n");
    for level in 0..depth {
        source.push_str(&format!("for (i{level} = 0; i{level} < n; i{level}++) {{\n"));
    }
    source.push_str("total += 1;\n");
    for _ in 0..depth {
        source.push_str("}\n");
    }
    source.push_str("return total;\n}");
    source
}
