use super::render;
use crate::parser::{expand_implicit_multiplication, parse_expression, ParseOptions};
use crate::semantic::ExpressionKind;
use crate::{ErrorKind, ResourceLimits, TenetError};

fn parse(text: &str) -> Result<String, TenetError> {
    parse_expression(text, &ParseOptions::default(), &ResourceLimits::default(), None)
        .map(|expr| render(&expr))
}

fn parse_ok(text: &str) -> String {
    parse(text).unwrap_or_else(|e| panic!("failed to parse '{}': {}", text, e))
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(parse_ok("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(parse_ok("(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(parse_ok("10 - 4 - 3"), "((10 - 4) - 3)");
    assert_eq!(parse_ok("8 / 4 % 3"), "((8 / 4) % 3)");
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(parse_ok("2 ^ 3 ^ 2"), "(2 ^ (3 ^ 2))");
    assert_eq!(parse_ok("2 * 3 ^ 2"), "(2 * (3 ^ 2))");
}

#[test]
fn test_unary_binds_tighter_than_power() {
    assert_eq!(parse_ok("-2 ^ 2"), "((-2) ^ 2)");
    assert_eq!(parse_ok("!a && b"), "((!a) && b)");
    assert_eq!(parse_ok("!-x"), "(!(-x))");
    assert_eq!(parse_ok("1 - -2"), "(1 - (-2))");
}

#[test]
fn test_logical_operators_share_one_level() {
    assert_eq!(
        parse_ok("a > 1 && b < 2 || c"),
        "(((a > 1) && (b < 2)) || c)"
    );
    assert_eq!(parse_ok("a => b"), "(a => b)");
    assert_eq!(parse_ok("a <=> b"), "(a <=> b)");
    assert_eq!(parse_ok("a <= b"), "(a <= b)");
    assert_eq!(parse_ok("a >= b && c != d"), "((a >= b) && (c != d))");
}

#[test]
fn test_membership_and_set_operators() {
    assert_eq!(parse_ok("x in s union t"), "(x in (s union t))");
    assert_eq!(parse_ok("a intersect b diff c"), "((a intersect b) diff c)");
    assert_eq!(parse_ok("index in items"), "(index in items)");
}

#[test]
fn test_literals() {
    assert_eq!(parse_ok("'a b' == \"c\""), "(\"a b\" == \"c\")");
    assert_eq!(parse_ok("true && false"), "(true && false)");
    assert_eq!(parse_ok("3.25"), "3.25");
    assert_eq!(parse_ok("trueish"), "trueish");
}

#[test]
fn test_function_calls() {
    assert_eq!(parse_ok("f(1, g(2))"), "f(1, g(2))");
    assert_eq!(parse_ok("now()"), "now()");
    assert_eq!(
        parse_ok("path(routes, 'A', 'C')"),
        "path(routes, \"A\", \"C\")"
    );
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(parse_ok("2x + 3"), "((2 * x) + 3)");
    assert_eq!(parse_ok("x2 + 1"), "(x2 + 1)");
    assert_eq!(expand_implicit_multiplication("'2x'"), "'2x'");
    assert_eq!(expand_implicit_multiplication("3.5rate"), "3.5*rate");
}

#[test]
fn test_namespace_qualification() {
    let parameters = vec!["n".to_string()];
    let options = ParseOptions {
        namespace: Some("lib"),
        parameters: &parameters,
    };
    let expr = parse_expression(
        "n * factor + eval(rate) + item",
        &options,
        &ResourceLimits::default(),
        None,
    )
    .unwrap();
    assert_eq!(render(&expr), "(((n * lib.factor) + eval(lib.rate)) + item)");
}

#[test]
fn test_calls_are_qualified() {
    let options = ParseOptions::with_namespace(Some("tax"));
    let expr =
        parse_expression("rate(income)", &options, &ResourceLimits::default(), None).unwrap();
    match expr.kind {
        ExpressionKind::FunctionCall(call) => {
            assert_eq!(call.name, "tax.rate");
            assert_eq!(render(&call.arguments[0]), "tax.income");
        }
        other => panic!("expected a call, got {:?}", other),
    }
}

#[test]
fn test_every_node_carries_the_line() {
    let expr = parse_expression(
        "a + b",
        &ParseOptions::default(),
        &ResourceLimits::default(),
        Some(7),
    )
    .unwrap();
    assert_eq!(expr.line, Some(7));
    match expr.kind {
        ExpressionKind::Arithmetic(left, _, right) => {
            assert_eq!(left.line, Some(7));
            assert_eq!(right.line, Some(7));
            assert_ne!(left.id, right.id);
        }
        other => panic!("expected arithmetic, got {:?}", other),
    }
}

#[test]
fn test_empty_expression() {
    let err = parse("   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "Empty expression");
}

#[test]
fn test_incomplete_expression() {
    let err = parse("1 +").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("'1 +'"), "{}", err);
}

#[test]
fn test_unsupported_character() {
    let err = parse("1 # 2").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(
        err.message().contains("Unsupported character '#'"),
        "{}",
        err
    );
}

#[test]
fn test_unbalanced_parentheses() {
    assert!(parse("(1 + 2").is_err());
    assert!(parse("1 + 2)").is_err());
}

#[test]
fn test_nesting_limit() {
    let limits = ResourceLimits {
        max_expression_depth: 3,
        ..ResourceLimits::default()
    };
    let options = ParseOptions::default();

    assert!(parse_expression("(((1)))", &options, &limits, None).is_ok());

    let err = parse_expression("((((1))))", &options, &limits, Some(2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("exceeds the maximum depth of 3"));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_long_operator_chains_count_toward_nesting() {
    let limits = ResourceLimits {
        max_expression_depth: 3,
        ..ResourceLimits::default()
    };
    let options = ParseOptions::default();

    assert!(parse_expression("1 + 1 + 1 + 1", &options, &limits, None).is_ok());
    let err = parse_expression("1 + 1 + 1 + 1 + 1", &options, &limits, None).unwrap_err();
    assert!(err.message().contains("exceeds the maximum depth of 3"));
}

#[test]
fn test_deep_nesting_is_rejected_without_overflow() {
    let text = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    let err = parse(&text).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_prefix_runs_count_toward_nesting() {
    let limits = ResourceLimits {
        max_expression_depth: 3,
        ..ResourceLimits::default()
    };
    let options = ParseOptions::default();

    assert_eq!(parse_ok("--1"), "(-(-1))");
    assert!(parse_expression("!!!true", &options, &limits, None).is_ok());
    assert!(parse_expression("1 - -2", &options, &limits, None).is_ok());

    let err = parse_expression("!!!!true", &options, &limits, Some(5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("exceeds the maximum depth of 3"));
    assert_eq!(err.line(), Some(5));
}

#[test]
fn test_long_prefix_runs_are_rejected_without_overflow() {
    let negations = format!("{}1", "-".repeat(1000));
    let err = parse(&negations).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(err.message().contains("exceeds the maximum depth of 100"));

    let nots = format!("{}true", "!".repeat(300_000));
    let err = parse(&nots).unwrap_err();
    assert!(err.message().contains("exceeds the maximum depth of 100"));
}

#[test]
fn test_prefix_runs_inside_groups_are_charged_by_the_builder() {
    let limits = ResourceLimits {
        max_expression_depth: 4,
        ..ResourceLimits::default()
    };
    let options = ParseOptions::default();

    assert!(parse_expression("(-(-1))", &options, &limits, None).is_ok());
    assert!(parse_expression("((--1))", &options, &limits, None).is_ok());

    // Runs split by groups pass the text estimate but not the builder
    let err = parse_expression("-(-(-1))", &options, &limits, None).unwrap_err();
    assert!(err.message().contains("exceeds the maximum depth of 4"));
}

#[test]
fn test_chain_overflow_explains_operator_cost() {
    let limits = ResourceLimits {
        max_expression_depth: 3,
        ..ResourceLimits::default()
    };
    let err = parse_expression("a + b + c + d + e", &ParseOptions::default(), &limits, None)
        .unwrap_err();
    assert!(err.message().contains("exceeds the maximum depth of 3"));
    assert!(err
        .suggestion()
        .is_some_and(|s| s.contains("Each operator in a chain")));

    let flat = (0..100)
        .map(|i| format!("a{}", i))
        .collect::<Vec<_>>()
        .join(" + ");
    assert!(parse(&flat).is_ok());
}
