//! Heuristic time and space complexity estimation.
//!
//! The estimate is derived from structural facts about the syntax tree (loop
//! nesting, array declarations, declaration counts) plus the decision points
//! of the entry function's control-flow graph. It is a plausible signal, not a
//! proof: the classes only ever reach O(n²).

use std::fmt;

use smol_str::SmolStr;

use crate::ast::{NodeId, SyntaxKind, SyntaxTree};
use crate::cfg::ControlFlowGraph;

/// An ordinal complexity class, from O(1) to O(n!).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComplexityClass {
    Constant = 1,
    Logarithmic = 2,
    Linear = 3,
    Linearithmic = 4,
    Quadratic = 5,
    Cubic = 6,
    Exponential = 7,
    Factorial = 8,
}

impl ComplexityClass {
    /// Returns the ordinal, 1 through 8.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns the class for an ordinal, or `None` outside 1 through 8.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Some(match ordinal {
            1 => Self::Constant,
            2 => Self::Logarithmic,
            3 => Self::Linear,
            4 => Self::Linearithmic,
            5 => Self::Quadratic,
            6 => Self::Cubic,
            7 => Self::Exponential,
            8 => Self::Factorial,
            _ => return None,
        })
    }

    /// Returns big-O notation for this class.
    pub fn notation(self) -> &'static str {
        match self {
            Self::Constant => "O(1)",
            Self::Logarithmic => "O(log n)",
            Self::Linear => "O(n)",
            Self::Linearithmic => "O(n log n)",
            Self::Quadratic => "O(n²)",
            Self::Cubic => "O(n³)",
            Self::Exponential => "O(2ⁿ)",
            Self::Factorial => "O(n!)",
        }
    }
}

impl fmt::Display for ComplexityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.notation())
    }
}

/// Estimated running time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeComplexity {
    pub class: ComplexityClass,
    /// Contributing factors in a fixed order.
    pub factors: Vec<String>,
}

/// Estimated memory use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceComplexity {
    pub class: ComplexityClass,
    pub details: Vec<String>,
}

/// An optimization hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
}

impl Suggestion {
    fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Complete complexity estimate for one compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexityInfo {
    pub time: TimeComplexity,
    pub space: SpaceComplexity,
    pub suggestions: Vec<Suggestion>,
}

/// Structural facts the estimate is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramInfo {
    /// Number of `for` and `while` statements.
    pub loop_count: usize,
    /// Deepest loop nesting; 1 for a loop that contains no other loop.
    pub max_loop_depth: usize,
    /// Total VARIABLE_DECLARATION count across all functions.
    pub declaration_count: usize,
    /// Declarations whose type text has an array suffix, as (name, type).
    pub array_declarations: Vec<(SmolStr, SmolStr)>,
    /// Functions whose body calls the function itself.
    pub recursive_functions: Vec<SmolStr>,
}

impl ProgramInfo {
    /// Collects structural facts from a syntax tree.
    pub fn from_tree(tree: &SyntaxTree) -> Self {
        let mut info = Self::default();
        info.visit(tree, tree.root_id(), 0);

        for function in tree.functions() {
            let calls_itself = tree.descendants(function.id).any(|node| {
                node.kind == SyntaxKind::FunctionCall && node.text() == function.text()
            });
            if calls_itself {
                info.recursive_functions.push(SmolStr::new(function.text()));
            }
        }
        info
    }

    /// Returns true if any loop contains another loop.
    pub fn has_nested_loops(&self) -> bool {
        self.max_loop_depth >= 2
    }

    pub fn has_loops(&self) -> bool {
        self.loop_count > 0
    }

    pub fn has_arrays(&self) -> bool {
        !self.array_declarations.is_empty()
    }

    fn visit(&mut self, tree: &SyntaxTree, id: NodeId, loop_depth: usize) {
        let Some(node) = tree.get(id) else {
            return;
        };

        let mut depth = loop_depth;
        match node.kind {
            kind if kind.is_loop() => {
                depth += 1;
                self.loop_count += 1;
                self.max_loop_depth = self.max_loop_depth.max(depth);
            }
            SyntaxKind::VariableDeclaration => {
                self.declaration_count += 1;
                let ty = tree
                    .child_of_kind(id, SyntaxKind::Type)
                    .map_or("", |ty| ty.text());
                if ty.contains('[') || ty.contains(']') {
                    let name = tree
                        .child_of_kind(id, SyntaxKind::Identifier)
                        .map_or("", |name| name.text());
                    self.array_declarations
                        .push((SmolStr::new(name), SmolStr::new(ty)));
                }
            }
            _ => {}
        }

        for child in &node.children {
            self.visit(tree, *child, depth);
        }
    }
}

/// Estimates complexity from the syntax tree and the entry function's graph.
///
/// Returns `None` if either is absent. Declarations beyond
/// `many_variables_threshold` raise the space class to O(log n).
pub fn estimate_complexity(
    tree: Option<&SyntaxTree>,
    graph: Option<&ControlFlowGraph>,
    many_variables_threshold: usize,
) -> Option<ComplexityInfo> {
    let tree = tree?;
    let graph = graph?;
    let info = ProgramInfo::from_tree(tree);

    let time = estimate_time(&info, graph);
    let space = estimate_space(&info, many_variables_threshold);
    let suggestions = suggestions(&info, many_variables_threshold);

    tracing::debug!(
        time = time.class.ordinal(),
        space = space.class.ordinal(),
        loops = info.loop_count,
        "estimated complexity"
    );
    Some(ComplexityInfo {
        time,
        space,
        suggestions,
    })
}

fn estimate_time(info: &ProgramInfo, graph: &ControlFlowGraph) -> TimeComplexity {
    let mut factors = Vec::new();
    let class = if info.has_nested_loops() {
        factors.push(format!(
            "Nested loops detected (maximum depth {})",
            info.max_loop_depth
        ));
        ComplexityClass::Quadratic
    } else if info.has_loops() {
        factors.push(format!("{} loop(s) without nesting", info.loop_count));
        ComplexityClass::Linear
    } else {
        factors.push("No loops: every statement runs a bounded number of times".to_string());
        ComplexityClass::Constant
    };

    if info.has_nested_loops() {
        factors.push(format!("{} loop(s) in total", info.loop_count));
    }

    let decisions = graph.decision_count();
    if decisions > 0 {
        factors.push(format!(
            "{decisions} decision point(s) in '{}'",
            graph.function()
        ));
    }
    for function in &info.recursive_functions {
        factors.push(format!("Function '{function}' calls itself"));
    }

    TimeComplexity { class, factors }
}

fn estimate_space(info: &ProgramInfo, threshold: usize) -> SpaceComplexity {
    let mut details = Vec::new();
    let class = if info.has_arrays() {
        for (name, ty) in &info.array_declarations {
            details.push(format!("Array '{name}' declared with type '{ty}'"));
        }
        ComplexityClass::Linear
    } else if info.declaration_count > threshold {
        details.push(format!(
            "{} variable declarations exceed the threshold of {threshold}",
            info.declaration_count
        ));
        ComplexityClass::Logarithmic
    } else {
        details.push(format!(
            "{} scalar variable declaration(s)",
            info.declaration_count
        ));
        ComplexityClass::Constant
    };

    SpaceComplexity { class, details }
}

fn suggestions(info: &ProgramInfo, threshold: usize) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();
    if info.has_nested_loops() {
        suggestions.push(Suggestion::new(
            "Reduce nested loops",
            "Nested iteration grows quadratically with input size. Consider a lookup table \
             or restructuring the inner loop so each element is visited once.",
        ));
    } else if info.has_loops() {
        suggestions.push(Suggestion::new(
            "Hoist loop-invariant work",
            "Move computations that do not change between iterations out of the loop body.",
        ));
    }
    if info.has_arrays() {
        suggestions.push(Suggestion::new(
            "Review array sizes",
            "Array storage grows with its declared size. Reuse buffers where possible \
             instead of declaring new arrays.",
        ));
    } else if info.declaration_count > threshold {
        suggestions.push(Suggestion::new(
            "Group related variables",
            "Many separate variables are hard to track. Group related values into an array \
             or a structure.",
        ));
    }
    if !info.recursive_functions.is_empty() {
        suggestions.push(Suggestion::new(
            "Consider memoization",
            "Recursive calls that repeat the same arguments can cache their results.",
        ));
    }
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::build_cfg;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn estimate(source: &str) -> ComplexityInfo {
        let tree = parse(&tokenize(source).tokens).expect("parse should succeed");
        let graph = build_cfg(&tree, "main").expect("build should succeed");
        estimate_complexity(Some(&tree), graph.as_ref(), 10).expect("estimate")
    }

    #[test]
    fn ordinals_round_trip_through_notation() {
        assert_eq!(ComplexityClass::Constant.ordinal(), 1);
        assert_eq!(ComplexityClass::Factorial.ordinal(), 8);
        assert_eq!(ComplexityClass::from_ordinal(5), Some(ComplexityClass::Quadratic));
        assert_eq!(ComplexityClass::from_ordinal(0), None);
        assert_eq!(ComplexityClass::from_ordinal(9), None);
        assert_eq!(ComplexityClass::Linearithmic.to_string(), "O(n log n)");
    }

    #[test]
    fn straight_line_code_is_constant() {
        let info = estimate("int main() { int x = 10; return 0; }");
        assert_eq!(info.time.class, ComplexityClass::Constant);
        assert_eq!(info.space.class, ComplexityClass::Constant);
        assert!(info.suggestions.is_empty());
    }

    #[test]
    fn single_loop_is_linear() {
        let info = estimate("int main() { while (n > 0) { n -= 1; } }");
        assert_eq!(info.time.class, ComplexityClass::Linear);
        assert!(info.time.factors[0].starts_with("1 loop(s)"));
        assert!(info.time.factors.iter().any(|f| f.contains("decision point")));
    }

    #[test]
    fn nested_loops_are_quadratic() {
        let info = estimate(
            "int main() { for (i = 0; i < n; i++) { for (j = 0; j < n; j++) { s += j; } } }",
        );
        assert_eq!(info.time.class, ComplexityClass::Quadratic);
        assert!(info.time.factors[0].contains("Nested loops"));
        assert_eq!(info.suggestions[0].title, "Reduce nested loops");
    }

    #[test]
    fn loops_in_other_functions_count() {
        let info = estimate("void work() { while (1) { } } int main() { return 0; }");
        assert_eq!(info.time.class, ComplexityClass::Linear);
    }

    #[test]
    fn array_declarations_are_linear_space() {
        let info = estimate("int main() { int values[100]; }");
        assert_eq!(info.space.class, ComplexityClass::Linear);
        assert_eq!(
            info.space.details,
            vec!["Array 'values' declared with type 'int[100]'".to_string()]
        );
    }

    #[test]
    fn many_declarations_are_logarithmic_space() {
        let body: String = (0..11).map(|i| format!("int v{i} = {i}; ")).collect();
        let info = estimate(&format!("int main() {{ {body} }}"));
        assert_eq!(info.space.class, ComplexityClass::Logarithmic);

        let body: String = (0..10).map(|i| format!("int v{i}; ")).collect();
        let info = estimate(&format!("int main() {{ {body} }}"));
        assert_eq!(info.space.class, ComplexityClass::Constant);
    }

    #[test]
    fn recursion_is_reported_without_changing_class() {
        let info = estimate("int main() { main(); }");
        assert_eq!(info.time.class, ComplexityClass::Constant);
        assert!(info
            .time
            .factors
            .contains(&"Function 'main' calls itself".to_string()));
        assert!(info.suggestions.iter().any(|s| s.title == "Consider memoization"));
    }

    #[test]
    fn missing_inputs_yield_none() {
        let tree = parse(&tokenize("int helper() { }").tokens).expect("parse");
        assert!(estimate_complexity(Some(&tree), None, 10).is_none());
        assert!(estimate_complexity(None, None, 10).is_none());
    }

    #[test]
    fn loop_depth_tracks_deepest_nesting() {
        let tree = parse(
            &tokenize("int main() { while (a) { if (b) { for (;;) { while (c) { } } } } }").tokens,
        )
        .expect("parse");
        let info = ProgramInfo::from_tree(&tree);
        assert_eq!(info.loop_count, 3);
        assert_eq!(info.max_loop_depth, 3);
    }
}
