mod common;

use common::*;
use insta::assert_snapshot;
use tenet::{DocNode, Engine, ErrorKind, TenetError};

// ============================================================================
// DISPLAY FORMAT
// ============================================================================

#[test]
fn test_error_display_format() {
    assert_snapshot!(TenetError::syntax("Unexpected end of expression '1 +'"), @"Syntax error: Unexpected end of expression '1 +'");
    assert_snapshot!(
        TenetError::runtime("Division by zero").with_line(Some(12)),
        @"Runtime error: Division by zero at line 12"
    );
    assert_snapshot!(
        TenetError::semantic("Duplicate rule 'a'")
            .with_suggestion("Rename one of the declarations")
            .with_line(Some(3)),
        @"Semantic error: Duplicate rule 'a' (suggestion: Rename one of the declarations) at line 3"
    );
}

#[test]
fn test_with_line_none_keeps_existing_line() {
    let error = TenetError::runtime("boom").with_line(Some(4)).with_line(None);
    assert_eq!(error.line(), Some(4));
    assert_eq!(error.kind(), ErrorKind::Runtime);
}

// ============================================================================
// ENGINE ERRORS
// ============================================================================

fn first_error(sections: Vec<DocNode>) -> TenetError {
    let result = Engine::new().evaluate(Some(&document(sections)), None);
    assert!(!result.errors.is_empty(), "expected an error");
    result.errors[0].clone()
}

#[test]
fn test_division_by_zero_message() {
    let error = first_error(vec![queries(vec![query("q", "1 / 0").with_line(5)])]);
    assert_snapshot!(error, @"Runtime error: Division by zero at line 5");
}

#[test]
fn test_type_mismatch_message() {
    let error = first_error(vec![queries(vec![query("q", "'a' * 2").with_line(6)])]);
    assert_snapshot!(
        error,
        @"Runtime error: Cannot apply multiplication to string and number (suggestion: Arithmetic operators only accept numbers) at line 6"
    );
}

#[test]
fn test_unknown_function_message() {
    let error = first_error(vec![queries(vec![query("q", "nope(1)").with_line(7)])]);
    assert_snapshot!(
        error,
        @"Runtime error: Unknown function 'nope' (suggestion: Declare it as a <function> or <rule> in a rules section) at line 7"
    );
}

#[test]
fn test_unresolved_reference_message() {
    let error = first_error(vec![symbols(vec![var("x", "number", "ghost").with_line(2)])]);
    assert_snapshot!(
        error,
        @"Semantic error: Unresolved reference 'ghost' in symbol 'x' (suggestion: Declare the referenced symbol first, or quote the value to use it as text) at line 2"
    );
}

#[test]
fn test_duplicate_rule_message() {
    let error = first_error(vec![rules(vec![
        rule("a", "1").with_line(3),
        rule("a", "2").with_line(4),
    ])]);
    assert_snapshot!(
        error,
        @"Semantic error: Duplicate rule 'a' (suggestion: Rename one of the declarations; the first one is kept) at line 4"
    );
}

#[test]
fn test_unknown_aggregate_message() {
    let error = first_error(vec![
        symbols(vec![set("s", "1, 2")]),
        queries(vec![DocNode::new("aggregate")
            .with_attr("function", "median")
            .with_attr("target", "s")
            .with_line(9)]),
    ]);
    assert_snapshot!(
        error,
        @"Semantic error: Unknown aggregate function 'median' (suggestion: Use one of: count, sum, min, max, avg) at line 9"
    );
}

#[test]
fn test_unknown_domain_tag_message() {
    let error = first_error(vec![queries(vec![DocNode::new("weather").with_line(11)])]);
    assert_snapshot!(
        error,
        @"Semantic error: Unknown domain tag 'weather' (suggestion: Register a handler for this tag with the engine) at line 11"
    );
}
