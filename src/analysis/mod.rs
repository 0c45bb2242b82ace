//! Program analysis built on the syntax tree and control-flow graph.

pub mod complexity;

pub use complexity::{
    ComplexityClass, ComplexityInfo, ProgramInfo, SpaceComplexity, Suggestion, TimeComplexity,
    estimate_complexity,
};
