//! Internal pipeline failures (E9xxx).
//!
//! These describe states the front end cannot represent, not findings about
//! the analyzed source. The pipeline converts any of them into a single fatal
//! [`Diag`](crate::diag::Diag) instead of returning them to callers.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("block nesting depth {depth} exceeds the limit of {limit} at line {line}, column {column}")]
    #[diagnostic(
        code(E9001),
        help("flatten the innermost blocks or raise `max_nesting_depth`")
    )]
    NestingTooDeep {
        depth: usize,
        limit: usize,
        line: usize,
        column: usize,
    },

    #[error("syntax node #{id} does not exist")]
    #[diagnostic(code(E9002))]
    InvalidNode { id: usize },

    #[error("{stage} stage panicked: {detail}")]
    #[diagnostic(code(E9003))]
    StagePanicked { stage: &'static str, detail: String },
}
