use crate::resolver::{parse_override, Resolver};
use crate::semantic::{SymbolKind, SymbolTable, SymbolType};
use crate::{DocNode, ErrorKind, TenetError, Value};
use std::collections::BTreeSet;

fn document(declarations: Vec<DocNode>) -> DocNode {
    DocNode::new("document").with_child(DocNode::new("symbols").with_children(declarations))
}

fn var(name: &str, symbol_type: &str, init: &str) -> DocNode {
    DocNode::new("var")
        .with_attr("name", name)
        .with_attr("type", symbol_type)
        .with_attr("init", init)
}

fn resolve(declarations: Vec<DocNode>) -> (SymbolTable, Vec<TenetError>) {
    Resolver::new().resolve(Some(&document(declarations)), None)
}

fn messages(errors: &[TenetError]) -> Vec<&str> {
    errors.iter().map(TenetError::message).collect()
}

#[test]
fn test_scalar_declarations() {
    let (table, errors) = resolve(vec![
        var("age", "number", "42"),
        var("name", "string", "'Ada'"),
        var("active", "boolean", "true"),
        DocNode::new("const")
            .with_attr("name", "limit")
            .with_attr("value", "10"),
        DocNode::new("var").with_attr("name", "note").with_text("  plain words  "),
    ]);

    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(table.len(), 5);

    let age = table.get("age").unwrap();
    assert_eq!(age.value, Value::Number(42.0));
    assert_eq!(age.kind, SymbolKind::Var);
    assert_eq!(age.symbol_type, SymbolType::Number);
    assert!(age.mutable);

    let limit = table.get("limit").unwrap();
    assert_eq!(limit.kind, SymbolKind::Const);
    assert_eq!(limit.symbol_type, SymbolType::Any);
    assert!(!limit.mutable);

    assert_eq!(table.get("name").unwrap().value, Value::text("Ada"));
    assert_eq!(table.get("active").unwrap().value, Value::Boolean(true));
    assert_eq!(table.get("note").unwrap().value, Value::text("plain words"));
}

#[test]
fn test_missing_value_is_null() {
    let (table, errors) = resolve(vec![DocNode::new("var")
        .with_attr("name", "pending")
        .with_attr("type", "number")]);
    assert!(errors.is_empty());
    assert_eq!(table.get("pending").unwrap().value, Value::Null);
}

#[test]
fn test_namespace_qualifies_names() {
    let doc = document(vec![var("rate", "number", "0.2")]);
    let (table, errors) = Resolver::new().resolve(Some(&doc), Some("tax"));
    assert!(errors.is_empty());
    assert!(table.contains("tax.rate"));
    assert!(!table.contains("rate"));
}

#[test]
fn test_null_document() {
    let (table, errors) = Resolver::new().resolve(None, None);
    assert!(table.is_empty());
    assert_eq!(messages(&errors), vec!["Document tree is null"]);
    assert_eq!(errors[0].kind(), ErrorKind::Semantic);
}

#[test]
fn test_duplicate_symbol_keeps_first() {
    let (table, errors) = resolve(vec![
        var("x", "number", "1").with_line(3),
        var("x", "number", "2").with_line(4),
    ]);
    assert_eq!(table.get("x").unwrap().value, Value::Number(1.0));
    assert_eq!(messages(&errors), vec!["Duplicate symbol 'x'"]);
    assert_eq!(errors[0].line(), Some(4));
}

#[test]
fn test_missing_name_and_unknown_tag() {
    let (table, errors) = resolve(vec![
        DocNode::new("var").with_attr("init", "1"),
        DocNode::new("variable").with_attr("name", "y"),
    ]);
    assert!(table.is_empty());
    assert_eq!(
        messages(&errors),
        vec![
            "Symbol declaration missing 'name' attribute on <var>",
            "Unknown symbol type 'variable'",
        ]
    );
}

#[test]
fn test_invalid_type_skips_declaration() {
    let (table, errors) = resolve(vec![var("x", "integer", "1")]);
    assert!(!table.contains("x"));
    assert_eq!(messages(&errors), vec!["Invalid type 'integer' for symbol 'x'"]);
}

#[test]
fn test_type_mismatch_is_reported_but_kept() {
    let (table, errors) = resolve(vec![var("flag", "number", "'yes'")]);
    assert_eq!(table.get("flag").unwrap().value, Value::text("yes"));
    assert_eq!(
        messages(&errors),
        vec!["Type mismatch: symbol 'flag' is declared number but its value is string"]
    );
}

#[test]
fn test_invalid_number_becomes_nan_with_one_error() {
    let (table, errors) = resolve(vec![var("n", "number", "12 apples")]);
    assert!(table.get("n").unwrap().value.is_nan());
    assert_eq!(messages(&errors), vec!["Invalid number '12 apples' for symbol 'n'"]);
}

#[test]
fn test_references() {
    let (table, errors) = resolve(vec![
        var("base", "number", "10"),
        var("copy", "number", "base"),
        var("loose", "any", "base"),
    ]);
    assert!(errors.is_empty(), "{:?}", errors);
    assert_eq!(table.get("copy").unwrap().value, Value::Number(10.0));
    assert_eq!(table.get("loose").unwrap().value, Value::Number(10.0));
}

#[test]
fn test_unresolved_reference_skips_symbol() {
    let (table, errors) = resolve(vec![var("x", "number", "missing")]);
    assert!(!table.contains("x"));
    assert_eq!(
        messages(&errors),
        vec!["Unresolved reference 'missing' in symbol 'x'"]
    );
}

#[test]
fn test_forward_reference_is_unresolved() {
    let (table, errors) = resolve(vec![var("x", "number", "y"), var("y", "number", "1")]);
    assert!(!table.contains("x"));
    assert!(table.contains("y"));
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_reference_type_mismatch() {
    let (table, errors) = resolve(vec![
        var("label", "string", "'hi'"),
        var("count", "number", "label"),
    ]);
    assert!(!table.contains("count"));
    assert_eq!(
        messages(&errors),
        vec!["Reference type mismatch: 'count' is declared number but 'label' is string"]
    );
}

#[test]
fn test_reference_prefers_namespaced_symbol() {
    let doc = document(vec![var("limit", "number", "5"), var("copy", "any", "limit")]);
    let outer = document(vec![var("limit", "number", "99")]);
    let (external, _) = Resolver::new().resolve(Some(&outer), None);

    let (table, errors) = Resolver::with_external(&external).resolve(Some(&doc), Some("ns"));
    assert!(errors.is_empty());
    assert_eq!(table.get("ns.copy").unwrap().value, Value::Number(5.0));
}

#[test]
fn test_external_symbols_are_visible() {
    let (external, _) =
        Resolver::new().resolve(Some(&document(vec![var("shared", "number", "7")])), None);
    let doc = document(vec![var("local", "number", "shared")]);
    let (table, errors) = Resolver::with_external(&external).resolve(Some(&doc), None);
    assert!(errors.is_empty());
    assert_eq!(table.get("local").unwrap().value, Value::Number(7.0));
    assert!(!table.contains("shared"));
}

#[test]
fn test_sets() {
    let (table, errors) = resolve(vec![
        var("base", "number", "5"),
        DocNode::new("set")
            .with_attr("name", "ages")
            .with_attr("elements", "42, 17, base, 17"),
        DocNode::new("set")
            .with_attr("name", "labels")
            .with_attr("elements", "'a', 'b'"),
    ]);
    assert!(errors.is_empty(), "{:?}", errors);

    let ages = table.get("ages").unwrap();
    assert_eq!(ages.symbol_type, SymbolType::Set);
    let expected: BTreeSet<Value> = [5.0, 17.0, 42.0].into_iter().map(Value::Number).collect();
    assert_eq!(ages.value, Value::Set(expected));

    let labels: BTreeSet<Value> = ["a", "b"].into_iter().map(Value::text).collect();
    assert_eq!(table.get("labels").unwrap().value, Value::Set(labels));
}

#[test]
fn test_set_with_bad_elements() {
    let (table, errors) = resolve(vec![DocNode::new("set")
        .with_attr("name", "s")
        .with_attr("elements", "1, nope, 2 3")]);
    assert_eq!(
        messages(&errors),
        vec![
            "Unresolved reference 'nope' in symbol 's'",
            "Invalid number '2 3' for symbol 's'",
        ]
    );
    let elements = table.get("s").unwrap().value.elements().unwrap().len();
    assert_eq!(elements, 2);
}

#[test]
fn test_graphs() {
    let (table, errors) = resolve(vec![DocNode::new("graph")
        .with_attr("name", "routes")
        .with_attr("nodes", "Z")
        .with_attr("edges", "A->B, B->rail->C, A->B->C->D, ->X")]);

    assert_eq!(
        messages(&errors),
        vec![
            "Malformed edge 'A->B->C->D' in graph 'routes'",
            "Malformed edge '->X' in graph 'routes'",
        ]
    );

    match &table.get("routes").unwrap().value {
        Value::Graph(graph) => {
            let nodes: Vec<&str> = graph.nodes.iter().map(String::as_str).collect();
            assert_eq!(nodes, vec!["A", "B", "C", "Z"]);
            assert_eq!(graph.edge_count(), 2);
            assert_eq!(graph.edges["B"]["rail"], "C");
            assert_eq!(graph.edges["A"]["to"], "B");
        }
        other => panic!("expected a graph, got {:?}", other),
    }
}

#[test]
fn test_entities() {
    let (table, errors) = resolve(vec![DocNode::new("entity")
        .with_attr("name", "alice")
        .with_attr("properties", "age=30, name='Alice', admin=true, role=staff, broken")]);

    assert_eq!(
        messages(&errors),
        vec!["Malformed property 'broken' in entity 'alice'"]
    );

    let alice = table.get("alice").unwrap();
    assert_eq!(alice.symbol_type, SymbolType::Object);
    match &alice.value {
        Value::Object(properties) => {
            assert_eq!(properties["age"], Value::Number(30.0));
            assert_eq!(properties["name"], Value::text("Alice"));
            assert_eq!(properties["admin"], Value::Boolean(true));
            assert_eq!(properties["role"], Value::text("staff"));
        }
        other => panic!("expected an object, got {:?}", other),
    }
}

#[test]
fn test_symbols_sections_at_any_depth() {
    let doc = DocNode::new("document").with_child(
        DocNode::new("module")
            .with_child(DocNode::new("symbols").with_child(var("deep", "number", "1"))),
    );
    let (table, errors) = Resolver::new().resolve(Some(&doc), None);
    assert!(errors.is_empty());
    assert!(table.contains("deep"));
}

#[test]
fn test_parse_override_by_declared_type() {
    let lookup = |name: &str| (name == "other").then(|| Value::Number(3.0));

    assert_eq!(
        parse_override("17", SymbolType::Number, lookup).unwrap(),
        Value::Number(17.0)
    );
    assert_eq!(
        parse_override("other", SymbolType::Number, lookup).unwrap(),
        Value::Number(3.0)
    );
    assert_eq!(
        parse_override("'x'", SymbolType::Number, lookup).unwrap(),
        Value::text("x")
    );
    assert_eq!(
        parse_override("red", SymbolType::String, lookup).unwrap(),
        Value::text("red")
    );
    assert_eq!(
        parse_override("no", SymbolType::Boolean, lookup)
            .unwrap_err()
            .message(),
        "Invalid boolean 'no'"
    );
    assert_eq!(
        parse_override("ten", SymbolType::Number, lookup)
            .unwrap_err()
            .message(),
        "Invalid number 'ten'"
    );
}
