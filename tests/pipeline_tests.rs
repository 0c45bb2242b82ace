//! Whole-pipeline properties and configuration switches.

mod common;

use std::thread;

use common::{Lcg, cfg_kinds, compile_cleanly, nested_loops, random_source};
use minic_frontend::{
    CfgNodeKind, CompilerConfig, ComplexityClass, SourceFile, compile, compile_with_config,
    diag::convert_diag_to_report,
};

const PROGRAMS: &[&str] = &[
    "int main() { int x = 10; return 0; }",
    "int main() { if (a) { b = 1; } else { b = 2; } while (b) { b -= 1; } }",
    "void helper(int n) { } int main() { helper(3); return 0; }",
    "int main() { for (i = 0; i < n; i++) { for (j = 0; j < n; j++) { } } }",
    "int main() { int data[64]; data = 0; }",
];

#[test]
fn repeated_compiles_are_identical() {
    for source in PROGRAMS {
        assert_eq!(compile(source), compile(source), "in {source}");
    }
}

#[test]
fn concurrent_compiles_match_sequential_ones() {
    let handles: Vec<_> = PROGRAMS
        .iter()
        .map(|source| thread::spawn(move || compile(source)))
        .collect();
    for (handle, source) in handles.into_iter().zip(PROGRAMS) {
        let threaded = handle.join().expect("compile thread panicked");
        assert_eq!(threaded, compile(source));
    }
}

#[test]
fn branch_free_functions_chain_from_entry_to_exit() {
    const STATEMENTS: &[&str] = &[
        "int a = 1;",
        "a = a + 2;",
        "printf(\"%d\", a);",
        "char c;",
        "total *= 3;",
        "log(a, 2);",
        "a++;",
    ];

    let mut rng = Lcg::new(7);
    for _ in 0..100 {
        let count = rng.below(12);
        let body: Vec<&str> = (0..count).map(|_| rng.pick(STATEMENTS)).collect();
        let source = format!("int main() {{ {} }}", body.join(" "));
        let result = compile_cleanly(&source);
        let graph = result.control_flow.expect("graph");

        let kinds = cfg_kinds(&graph);
        assert_eq!(kinds.first(), Some(&CfgNodeKind::Entry));
        assert_eq!(kinds.last(), Some(&CfgNodeKind::Exit));
        assert!(!kinds.iter().any(|kind| kind.is_decision()));

        for node in graph.nodes() {
            let expected = usize::from(node.kind != CfgNodeKind::Exit);
            assert_eq!(node.children.len(), expected, "in {source}");
            if let Some(next) = node.children.first() {
                assert_eq!(next.as_usize(), node.id.as_usize() + 1);
            }
        }
    }
}

#[test]
fn joined_graph_reaches_every_node_without_early_returns() {
    let source = "int main() {
        if (a) { if (b) { x = 1; } } else { y = 2; }
        while (c) { for (;;) { z = 3; } }
        return 0;
    }";
    let config = CompilerConfig::default().with_joined_control_flow(true);
    let graph = compile_with_config(source, &config)
        .control_flow
        .expect("graph");
    assert_eq!(graph.reachable_from_entry().len(), graph.len());
}

#[test]
fn chained_graph_is_acyclic_and_ends_in_exit() {
    let mut rng = Lcg::new(0xC4A1);
    for _ in 0..200 {
        let count = rng.below(60);
        let source = format!("int main() {{ {} }}", random_source(&mut rng, count));
        let Some(graph) = compile(&source).control_flow else {
            continue;
        };

        for node in graph.nodes() {
            for child in &node.children {
                assert!(child > &node.id, "back edge {node} -> {child} in {source:?}");
            }
            if matches!(node.kind, CfgNodeKind::Return) {
                assert!(node.children.iter().all(|child| *child == graph.exit()));
            }
        }
        assert!(graph.successors(graph.exit()).is_empty());
        assert!(graph.is_reachable(graph.exit()));
    }
}

#[test]
fn control_flow_joins_are_opt_in() {
    let source = "int main() { if (x) { a = 1; } b = 2; }";
    let branch_width = |config: &CompilerConfig| {
        let graph = compile_with_config(source, config)
            .control_flow
            .expect("graph");
        let branch = graph.nodes_of_kind(CfgNodeKind::If).next().expect("if").clone();
        (branch.children.len(), graph.reachable_from_entry().len(), graph.len())
    };

    assert_eq!(branch_width(&CompilerConfig::default()), (1, 4, 5));
    let joined = CompilerConfig::default().with_joined_control_flow(true);
    assert_eq!(branch_width(&joined), (2, 5, 5));
}

#[test]
fn time_class_is_monotonic_in_loop_nesting() {
    let time = |source: &str| {
        compile_cleanly(source)
            .complexity
            .expect("complexity")
            .time
            .class
    };

    let flat = time("int main() { x = 1; }");
    let single = time(&nested_loops(1));
    let nested = time(&nested_loops(2));
    let deeper = time(&nested_loops(4));

    assert!(flat <= single);
    assert!(single <= nested);
    assert!(nested <= deeper);
    assert_eq!(
        (flat, single, nested),
        (
            ComplexityClass::Constant,
            ComplexityClass::Linear,
            ComplexityClass::Quadratic,
        )
    );
}

#[test]
fn entry_function_is_configurable() {
    let source = "int start() { while (1) { } } int main() { return 0; }";
    let config = CompilerConfig::default().with_entry_function("start");
    let result = compile_with_config(source, &config);

    let graph = result.control_flow.expect("graph");
    assert_eq!(graph.function(), "start");
    assert!(cfg_kinds(&graph).contains(&CfgNodeKind::While));

    let missing = CompilerConfig::default().with_entry_function("absent");
    let result = compile_with_config(source, &missing);
    assert!(result.control_flow.is_none());
    assert!(result.complexity.is_none());
}

#[test]
fn fixes_are_opt_in() {
    let source = "int main() { int total = 0; if (total) { int step = 1; total += step; } return total; }";

    let quirks = compile(source);
    let names: Vec<&str> = quirks.scopes[0]
        .variables
        .iter()
        .map(|var| var.name.as_str())
        .collect();
    assert_eq!(names, vec!["total", "step"]);
    assert_eq!(quirks.warnings().count(), 3);

    let config = CompilerConfig::default()
        .with_isolated_block_scopes(true)
        .with_usage_tracking(true);
    let fixed = compile_with_config(source, &config);
    assert_eq!(fixed.scopes[0].variables.len(), 1);
    assert_eq!(fixed.warnings().count(), 0);
}

#[test]
fn space_threshold_is_configurable() {
    let source = "int main() { int a; int b; int c; }";
    let class = |threshold: usize| {
        let config = CompilerConfig::default().with_many_variables_threshold(threshold);
        compile_with_config(source, &config)
            .complexity
            .expect("complexity")
            .space
            .class
    };
    assert_eq!(class(10), ComplexityClass::Constant);
    assert_eq!(class(2), ComplexityClass::Logarithmic);
}

#[test]
fn random_inputs_never_fail_the_pipeline() {
    let mut rng = Lcg::new(0xFEED);
    for _ in 0..300 {
        let count = rng.below(80);
        let source = format!("int main() {{ {} }}", random_source(&mut rng, count));
        let result = compile(&source);
        assert!(!result.is_fatal(), "fatal on {source:?}: {:?}", result.diagnostics);
        assert!(!result.has_errors());
    }
}

#[test]
fn warnings_render_with_source_labels() {
    let source = "int main() {\n  int unused = 1;\n}";
    let result = compile(source);
    let file = SourceFile::with_name(source, "demo.c");
    let report = convert_diag_to_report(&result.diagnostics[0], &file);

    let rendered = format!("{report:?}");
    assert!(rendered.contains("W0001"), "{rendered}");
    assert!(rendered.contains("declared in scope 'main'"), "{rendered}");
}
