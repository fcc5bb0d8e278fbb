//! Compiler integration tests.
//!
//! End-to-end runs over in-memory description trees: parse -> scope tree ->
//! parallel evaluation -> outcomes. Covers the canonical binding-discipline
//! failures as seen from the whole pipeline, descendant poisoning, and
//! continuation across unrelated subtrees.

use bumpalo::Bump;
use strata_compiler::{DirOutcome, EvalResult, FileSet, Program};
use strata_module::ModuleRegistry;
use strata_scope::Value;

/// Helper: evaluate an in-memory tree of (path, text) files with no module
/// checking.
fn evaluate(files: &[(&str, &str)]) -> EvalResult {
    evaluate_with_registry(files, ModuleRegistry::new())
}

fn evaluate_with_registry(files: &[(&str, &str)], registry: ModuleRegistry) -> EvalResult {
    let arena = Bump::new();
    let mut set = FileSet::new();
    for (path, text) in files {
        set.add(*path, *text);
    }
    let program = Program::new(&arena, set, registry);
    program.evaluate().expect("input was consistent")
}

/// Helper: the single diagnostic message of a failed directory.
fn failure_message(result: &EvalResult, dir: &str) -> String {
    match result.outcomes.get(dir) {
        Some(DirOutcome::Failed { diagnostic }) => diagnostic.message_text.clone(),
        other => panic!("expected {dir:?} to fail, got {other:?}"),
    }
}

// ============================================================================
// Whole-pipeline binding discipline
// ============================================================================

#[test]
fn test_single_file_success() {
    let result = evaluate(&[("Strata.build", "cflags = \"-O2\"\nldflags = cflags")]);
    assert!(!result.has_errors());
    assert_eq!(
        result.variables_of("").unwrap(),
        vec![
            ("cflags".to_string(), Value::String("-O2".into())),
            ("ldflags".to_string(), Value::String("-O2".into())),
        ]
    );
}

#[test]
fn test_reference_before_assignment_fails() {
    let result = evaluate(&[("Strata.build", "x = foo\nfoo = \"hello\"")]);
    assert_eq!(failure_message(&result, ""), "undefined variable foo");
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_append_before_assignment_fails() {
    let result = evaluate(&[("Strata.build", "foo += \"world\"\nfoo = \"hello\"")]);
    assert_eq!(
        failure_message(&result, ""),
        "modified non-existent variable \"foo\" with +="
    );
}

#[test]
fn test_reassignment_fails() {
    let result = evaluate(&[("Strata.build", "foo = \"hello\"\nfoo = \"world\"")]);
    assert_eq!(
        failure_message(&result, ""),
        "variable already set, previous assignment: Strata.build:1:1"
    );
}

#[test]
fn test_inherited_reassignment_fails() {
    let result = evaluate(&[
        ("Strata.build", "foo = \"hello\""),
        ("foo/Strata.build", "foo = \"world\""),
    ]);
    assert!(result.outcomes.get("").unwrap().is_evaluated());
    assert_eq!(
        failure_message(&result, "foo"),
        "variable already set in inherited scope, previous assignment: Strata.build:1:1"
    );
}

#[test]
fn test_inherited_append_fails() {
    let result = evaluate(&[
        ("Strata.build", "foo = \"hello\""),
        ("foo/Strata.build", "foo += \"world\""),
    ]);
    assert_eq!(
        failure_message(&result, "foo"),
        "modified non-local variable \"foo\" with +="
    );
}

#[test]
fn test_append_after_reference_fails() {
    let result = evaluate(&[(
        "Strata.build",
        "foo = \"hello\"\nx = foo\nfoo += \"world\"",
    )]);
    assert_eq!(
        failure_message(&result, ""),
        "modified variable \"foo\" with += after referencing"
    );
}

// ============================================================================
// Inheritance across directories
// ============================================================================

#[test]
fn test_child_inherits_through_gap() {
    // lib/util has no description file; lib/util/str inherits from lib.
    let result = evaluate(&[
        ("lib/Strata.build", "prefix = \"lib\""),
        ("lib/util/str/Strata.build", "name = prefix + \"str\""),
    ]);
    assert!(!result.has_errors());
    assert_eq!(
        result.variables_of("lib/util/str").unwrap(),
        vec![("name".to_string(), Value::String("libstr".into()))]
    );
}

#[test]
fn test_sibling_scopes_are_independent() {
    // Both siblings bind the same name locally; no conflict.
    let result = evaluate(&[
        ("a/Strata.build", "srcs = [\"a.c\"]"),
        ("b/Strata.build", "srcs = [\"b.c\"]"),
    ]);
    assert!(!result.has_errors());
    assert_eq!(
        result.variables_of("a").unwrap()[0].1,
        Value::List(vec![Value::String("a.c".into())])
    );
    assert_eq!(
        result.variables_of("b").unwrap()[0].1,
        Value::List(vec![Value::String("b.c".into())])
    );
}

#[test]
fn test_deep_tree_evaluates_in_order() {
    let result = evaluate(&[
        ("Strata.build", "a = \"1\""),
        ("x/Strata.build", "b = a + \"2\""),
        ("x/y/Strata.build", "c = b + \"3\""),
        ("x/y/z/Strata.build", "d = c + \"4\""),
    ]);
    assert!(!result.has_errors());
    assert_eq!(
        result.variables_of("x/y/z").unwrap(),
        vec![("d".to_string(), Value::String("1234".into()))]
    );
}

// ============================================================================
// Failure isolation
// ============================================================================

#[test]
fn test_failed_directory_poisons_descendants_only() {
    let result = evaluate(&[
        ("bad/Strata.build", "x = missing"),
        ("bad/child/Strata.build", "y = \"ok\""),
        ("good/Strata.build", "z = \"ok\""),
    ]);

    assert_eq!(failure_message(&result, "bad"), "undefined variable missing");
    match result.outcomes.get("bad/child") {
        Some(DirOutcome::Skipped { ancestor }) => assert_eq!(ancestor, "bad"),
        other => panic!("expected skip, got {other:?}"),
    }
    // The unrelated subtree still evaluated.
    assert!(result.outcomes.get("good").unwrap().is_evaluated());
    // Exactly one diagnostic for the one failing directory.
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn test_sibling_failures_all_reported() {
    let result = evaluate(&[
        ("a/Strata.build", "x = missing_a"),
        ("b/Strata.build", "x = missing_b"),
        ("c/Strata.build", "x = \"fine\""),
    ]);
    assert_eq!(result.diagnostics.len(), 2);
    assert!(result.outcomes.get("c").unwrap().is_evaluated());
}

#[test]
fn test_syntax_error_passthrough() {
    let result = evaluate(&[
        ("broken/Strata.build", "x = "),
        ("broken/sub/Strata.build", "y = \"ok\""),
    ]);
    assert_eq!(failure_message(&result, "broken"), "Expression expected.");
    assert!(matches!(
        result.outcomes.get("broken/sub"),
        Some(DirOutcome::Skipped { .. })
    ));
}

#[test]
fn test_variables_of_failed_directory_is_none() {
    let result = evaluate(&[("Strata.build", "x = missing")]);
    assert!(result.variables_of("").is_none());
}

// ============================================================================
// Modules and the registry
// ============================================================================

#[test]
fn test_modules_collected_across_tree() {
    let mut registry = ModuleRegistry::new();
    registry.register("library", "a compiled library");
    registry.register("binary", "an executable");

    let result = evaluate_with_registry(
        &[
            (
                "lib/Strata.build",
                "srcs = [\"a.c\"]\nlibrary { name: \"util\", srcs: srcs }",
            ),
            (
                "app/Strata.build",
                "binary { name: \"tool\", deps: [\"util\"] }",
            ),
        ],
        registry,
    );
    assert!(!result.has_errors());
    let names: Vec<_> = result.modules().filter_map(|m| m.name()).collect();
    assert_eq!(names, vec!["tool", "util"]);
}

#[test]
fn test_unrecognized_module_type_fails_directory() {
    let mut registry = ModuleRegistry::new();
    registry.register("library", "a compiled library");

    let result = evaluate_with_registry(
        &[("Strata.build", "toolchain { name: \"gcc\" }")],
        registry,
    );
    assert_eq!(
        failure_message(&result, ""),
        "unrecognized module type \"toolchain\""
    );
}

#[test]
fn test_empty_registry_disables_module_checking() {
    let result = evaluate(&[("Strata.build", "anything_goes { name: \"x\" }")]);
    assert!(!result.has_errors());
    assert_eq!(result.modules().count(), 1);
}

// ============================================================================
// Scale
// ============================================================================

#[test]
fn test_wide_tree_of_siblings() {
    // Many independent siblings under one root; all inherit one value.
    let mut files = vec![("Strata.build".to_string(), "base = \"v\"".to_string())];
    for i in 0..64 {
        files.push((
            format!("mod{i}/Strata.build"),
            format!("name{i} = base + \"-{i}\""),
        ));
    }
    let borrowed: Vec<(&str, &str)> = files
        .iter()
        .map(|(p, t)| (p.as_str(), t.as_str()))
        .collect();
    let result = evaluate(&borrowed);
    assert!(!result.has_errors());
    assert_eq!(
        result.variables_of("mod7").unwrap(),
        vec![("name7".to_string(), Value::String("v-7".into()))]
    );
}
