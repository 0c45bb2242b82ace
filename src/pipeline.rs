//! The compile pipeline: tokenize, parse, resolve scopes, build the
//! control-flow graph and estimate complexity.
//!
//! [`compile_with_config`] always returns a [`CompilationResult`]. Each stage
//! runs behind a guard that turns a returned [`PipelineError`] or a panic into
//! the single fatal diagnostic, with every other field left empty.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use miette::Report;

use crate::analysis::{ComplexityInfo, estimate_complexity};
use crate::ast::SyntaxTree;
use crate::cfg::{CfgBuilder, ControlFlowGraph};
use crate::config::CompilerConfig;
use crate::diag::{Diag, SourceFile, convert_diagnostics_to_reports};
use crate::error::PipelineError;
use crate::lexer::token::Token;
use crate::lexer::tokenize;
use crate::parser::Parser;
use crate::semantic::{Scope, resolve_scopes};

/// Everything one compile request produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    /// Every emitted token, ERROR tokens included.
    pub tokens: Vec<Token>,
    /// The syntax tree, absent after a fatal error.
    pub syntax_tree: Option<SyntaxTree>,
    /// One root scope per function with a body.
    pub scopes: Vec<Scope>,
    /// Graph of the entry function, absent if it is not declared.
    pub control_flow: Option<ControlFlowGraph>,
    /// Absent whenever the tree or the graph is.
    pub complexity: Option<ComplexityInfo>,
    pub diagnostics: Vec<Diag>,
}

impl CompilationResult {
    /// The result reported when the pipeline itself fails.
    pub fn fatal(detail: impl fmt::Display) -> Self {
        Self {
            tokens: Vec::new(),
            syntax_tree: None,
            scopes: Vec::new(),
            control_flow: None,
            complexity: None,
            diagnostics: vec![Diag::fatal(detail)],
        }
    }

    /// Returns true if this is the result of a pipeline failure.
    pub fn is_fatal(&self) -> bool {
        self.syntax_tree.is_none()
            && self
                .diagnostics
                .iter()
                .any(|diag| diag.code.as_deref() == Some("E9999"))
    }

    /// Returns true if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diag::is_error)
    }

    /// Iterates over the warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diag> + '_ {
        self.diagnostics.iter().filter(|diag| !diag.is_error())
    }

    /// Renders the diagnostics as miette reports over `source`.
    pub fn reports(&self, source: &str) -> Vec<Report> {
        convert_diagnostics_to_reports(&self.diagnostics, &SourceFile::new(source))
    }
}

/// Compiles `source` with the default configuration.
pub fn compile(source: &str) -> CompilationResult {
    compile_with_config(source, &CompilerConfig::default())
}

/// Compiles `source`, converting any internal failure into a fatal result.
#[tracing::instrument(skip_all, fields(len = source.len()))]
pub fn compile_with_config(source: &str, config: &CompilerConfig) -> CompilationResult {
    match run_stages(source, config) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(error = %err, "compile failed");
            CompilationResult::fatal(err)
        }
    }
}

fn run_stages(source: &str, config: &CompilerConfig) -> Result<CompilationResult, PipelineError> {
    let lexed = guard("tokenize", || Ok(tokenize(source)))?;
    tracing::debug!(
        tokens = lexed.tokens.len(),
        errors = lexed.error_tokens().count(),
        "tokenized"
    );

    let tree = guard("parse", || {
        Parser::new(&lexed.tokens)
            .with_max_depth(config.max_nesting_depth)
            .parse()
    })?;
    tracing::debug!(nodes = tree.len(), functions = tree.functions().count(), "parsed");

    let resolution = guard("scope", || resolve_scopes(&tree, config))?;

    let control_flow = guard("cfg", || {
        CfgBuilder::new(&tree)
            .with_joins(config.join_control_flow)
            .build(&config.entry_function)
    })?;
    match &control_flow {
        Some(graph) => tracing::debug!(
            function = graph.function(),
            nodes = graph.len(),
            edges = graph.edge_count(),
            "built control-flow graph"
        ),
        None => tracing::debug!(
            function = %config.entry_function,
            "entry function not found"
        ),
    }

    let complexity = guard("complexity", || {
        Ok(estimate_complexity(
            Some(&tree),
            control_flow.as_ref(),
            config.many_variables_threshold,
        ))
    })?;

    let mut diagnostics = Vec::new();
    if config.report_lexical_errors {
        diagnostics.extend(lexed.error_diagnostics());
    }
    diagnostics.extend(resolution.diagnostics);

    Ok(CompilationResult {
        tokens: lexed.tokens,
        syntax_tree: Some(tree),
        scopes: resolution.scopes,
        control_flow,
        complexity,
        diagnostics,
    })
}

/// Runs one stage, converting a panic into [`PipelineError::StagePanicked`].
fn guard<T>(
    stage: &'static str,
    run: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    panic::catch_unwind(AssertUnwindSafe(run)).unwrap_or_else(|payload| {
        Err(PipelineError::StagePanicked {
            stage,
            detail: panic_detail(payload.as_ref()),
        })
    })
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
