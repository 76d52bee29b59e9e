//! Symbol resolution
//!
//! Turns the declarations found in `symbols` sections into a typed
//! [`SymbolTable`]. Resolution never stops at the first problem: every
//! declaration is checked on its own and errors are collected.

use crate::document::DocNode;
use crate::parser::literals::{classify, parse_number, split_list, AttributeLiteral};
use crate::semantic::{SymbolEntry, SymbolKind, SymbolTable, SymbolType};
use crate::value::{Graph, DEFAULT_RELATION};
use crate::{TenetError, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Tag of the sections holding symbol declarations
pub const SYMBOLS_SECTION: &str = "symbols";

/// Resolves symbol declarations into a [`SymbolTable`]
///
/// An optional external table (symbols merged in from imports) is consulted
/// for references that the document itself does not define.
#[derive(Default)]
pub struct Resolver<'a> {
    external: Option<&'a SymbolTable>,
}

/// What an attribute value denotes, before it is checked against a type
enum Parsed {
    Value(Value),
    /// Text that should have been a number; carries the raw text
    InvalidNumber(String),
    /// Reference to a symbol that does not exist
    Unresolved(String),
}

impl<'a> Resolver<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver that can also see symbols defined outside the document
    pub fn with_external(external: &'a SymbolTable) -> Self {
        Self {
            external: Some(external),
        }
    }

    /// Resolve every declaration in the document's `symbols` sections.
    ///
    /// A missing tree is the only fatal case: it yields an empty table and a
    /// single error.
    pub fn resolve(
        &self,
        doc: Option<&DocNode>,
        namespace: Option<&str>,
    ) -> (SymbolTable, Vec<TenetError>) {
        let mut table = SymbolTable::new();
        let mut errors = Vec::new();

        let doc = match doc {
            Some(doc) => doc,
            None => {
                errors.push(TenetError::semantic("Document tree is null"));
                return (table, errors);
            }
        };

        for section in doc.find_all(SYMBOLS_SECTION) {
            for declaration in &section.children {
                self.resolve_declaration(declaration, namespace, &mut table, &mut errors);
            }
        }

        debug!(
            symbols = table.len(),
            errors = errors.len(),
            namespace = namespace.unwrap_or(""),
            "resolved symbols"
        );
        (table, errors)
    }

    fn resolve_declaration(
        &self,
        node: &DocNode,
        namespace: Option<&str>,
        table: &mut SymbolTable,
        errors: &mut Vec<TenetError>,
    ) {
        let line = node.line;
        let name = match node.attr("name") {
            Some(name) if !name.trim().is_empty() => name.trim(),
            _ => {
                errors.push(
                    TenetError::semantic(format!(
                        "Symbol declaration missing 'name' attribute on <{}>",
                        node.tag
                    ))
                    .with_line(line),
                );
                return;
            }
        };
        let qualified = qualify(namespace, name);

        if table.contains(&qualified) {
            errors.push(
                TenetError::semantic(format!("Duplicate symbol '{}'", qualified))
                    .with_line(line)
                    .with_suggestion("Rename one of the declarations; the first one is kept"),
            );
            return;
        }

        let kind = match SymbolKind::from_tag(&node.tag) {
            Some(kind) => kind,
            None => {
                errors.push(
                    TenetError::semantic(format!("Unknown symbol type '{}'", node.tag))
                        .with_line(line)
                        .with_suggestion("Use one of: var, const, set, graph, entity"),
                );
                return;
            }
        };

        let declared_type = match node.attr("type").map(str::trim) {
            None | Some("") => None,
            Some(raw) => match SymbolType::parse(raw) {
                Some(symbol_type) => Some(symbol_type),
                None => {
                    errors.push(
                        TenetError::semantic(format!(
                            "Invalid type '{}' for symbol '{}'",
                            raw, qualified
                        ))
                        .with_line(line)
                        .with_suggestion(
                            "Use one of: number, string, boolean, list, set, graph, object, any",
                        ),
                    );
                    return;
                }
            },
        };

        let built = match kind {
            SymbolKind::Var | SymbolKind::Const => self.scalar(
                node,
                &qualified,
                declared_type.unwrap_or(SymbolType::Any),
                namespace,
                table,
                errors,
            ),
            SymbolKind::Set => Some(self.set(node, &qualified, namespace, table, errors)),
            SymbolKind::Graph => Some(graph(node, &qualified, errors)),
            SymbolKind::Entity => Some(entity(node, &qualified, errors)),
        };
        let (value, failed_number) = match built {
            Some(built) => built,
            None => return,
        };

        let symbol_type = match kind {
            SymbolKind::Var | SymbolKind::Const => declared_type.unwrap_or(SymbolType::Any),
            SymbolKind::Set => SymbolType::Set,
            SymbolKind::Graph => SymbolType::Graph,
            SymbolKind::Entity => SymbolType::Object,
        };

        if !failed_number && !matches!(value, Value::Null) && !symbol_type.accepts(&value) {
            errors.push(
                TenetError::semantic(format!(
                    "Type mismatch: symbol '{}' is declared {} but its value is {}",
                    qualified,
                    symbol_type,
                    value.type_name()
                ))
                .with_line(line),
            );
        }

        let entry = SymbolEntry {
            kind,
            symbol_type,
            value,
            mutable: kind == SymbolKind::Var,
            line,
        };
        // Presence was checked above, so this cannot collide
        let _ = table.insert(qualified, entry);
    }

    /// Value of a `var`/`const`; the flag is set when a number failed to parse.
    fn scalar(
        &self,
        node: &DocNode,
        qualified: &str,
        declared: SymbolType,
        namespace: Option<&str>,
        table: &SymbolTable,
        errors: &mut Vec<TenetError>,
    ) -> Option<(Value, bool)> {
        let raw = match node.attr_or_text(&["init", "value"]) {
            Some(raw) => raw,
            None => return Some((Value::Null, false)),
        };

        match self.parse_value(raw, declared, namespace, table) {
            Parsed::Value(value) => {
                if let AttributeLiteral::Reference(reference) = classify(raw) {
                    if let Some(referenced) = self.lookup(reference, namespace, table) {
                        let found = referenced.symbol_type;
                        if declared != SymbolType::Any
                            && found != SymbolType::Any
                            && declared != found
                        {
                            errors.push(
                                TenetError::semantic(format!(
                                    "Reference type mismatch: '{}' is declared {} but '{}' is {}",
                                    qualified, declared, reference, found
                                ))
                                .with_line(node.line),
                            );
                            return None;
                        }
                    }
                }
                Some((value, false))
            }
            Parsed::InvalidNumber(text) => {
                errors.push(invalid_number(&text, qualified, node.line));
                Some((Value::Number(f64::NAN), true))
            }
            Parsed::Unresolved(reference) => {
                errors.push(unresolved(&reference, qualified, node.line));
                None
            }
        }
    }

    fn set(
        &self,
        node: &DocNode,
        qualified: &str,
        namespace: Option<&str>,
        table: &SymbolTable,
        errors: &mut Vec<TenetError>,
    ) -> (Value, bool) {
        let mut elements = BTreeSet::new();
        let mut failed_number = false;

        for element in split_list(node.attr("elements").unwrap_or("")) {
            match self.parse_value(element, SymbolType::Number, namespace, table) {
                Parsed::Value(value) => {
                    elements.insert(value);
                }
                Parsed::InvalidNumber(text) => {
                    errors.push(invalid_number(&text, qualified, node.line));
                    elements.insert(Value::Number(f64::NAN));
                    failed_number = true;
                }
                Parsed::Unresolved(reference) => {
                    errors.push(unresolved(&reference, qualified, node.line));
                }
            }
        }

        (Value::Set(elements), failed_number)
    }

    /// Literal-or-reference parsing shared by scalars and set elements
    fn parse_value(
        &self,
        raw: &str,
        declared: SymbolType,
        namespace: Option<&str>,
        table: &SymbolTable,
    ) -> Parsed {
        match classify(raw) {
            AttributeLiteral::Quoted(text) => Parsed::Value(Value::text(text)),
            AttributeLiteral::Boolean(b) => Parsed::Value(Value::Boolean(b)),
            AttributeLiteral::Number(n) => Parsed::Value(Value::Number(n)),
            AttributeLiteral::Reference(reference) => {
                match self.lookup(reference, namespace, table) {
                    Some(entry) => Parsed::Value(entry.value.clone()),
                    None => Parsed::Unresolved(reference.to_string()),
                }
            }
            AttributeLiteral::Bare(text) => match declared {
                SymbolType::Number => Parsed::InvalidNumber(text.to_string()),
                _ => Parsed::Value(Value::text(text)),
            },
        }
    }

    /// Look a reference up namespace-qualified first, then bare
    fn lookup<'t>(
        &'t self,
        reference: &str,
        namespace: Option<&str>,
        table: &'t SymbolTable,
    ) -> Option<&'t SymbolEntry> {
        let qualified = qualify(namespace, reference);
        let candidates = [qualified.as_str(), reference];
        candidates.iter().find_map(|name| {
            table
                .get(name)
                .or_else(|| self.external.and_then(|external| external.get(name)))
        })
    }
}

fn graph(node: &DocNode, qualified: &str, errors: &mut Vec<TenetError>) -> (Value, bool) {
    let mut graph = Graph::new();

    for name in split_list(node.attr("nodes").unwrap_or("")) {
        graph.add_node(name);
    }

    for edge in split_list(node.attr("edges").unwrap_or("")) {
        let segments: Vec<&str> = edge.split("->").map(str::trim).collect();
        match segments.as_slice() {
            [from, to] if !from.is_empty() && !to.is_empty() => {
                graph.add_edge(*from, DEFAULT_RELATION, *to)
            }
            [from, relation, to]
                if !from.is_empty() && !relation.is_empty() && !to.is_empty() =>
            {
                graph.add_edge(*from, *relation, *to)
            }
            _ => errors.push(
                TenetError::semantic(format!(
                    "Malformed edge '{}' in graph '{}'",
                    edge, qualified
                ))
                .with_line(node.line)
                .with_suggestion("Write edges as 'from->to' or 'from->relation->to'"),
            ),
        }
    }

    (Value::Graph(graph), false)
}

fn entity(node: &DocNode, qualified: &str, errors: &mut Vec<TenetError>) -> (Value, bool) {
    let mut properties = BTreeMap::new();

    for property in split_list(node.attr("properties").unwrap_or("")) {
        let (key, raw) = match property.split_once('=') {
            Some((key, raw)) if !key.trim().is_empty() => (key.trim(), raw.trim()),
            _ => {
                errors.push(
                    TenetError::semantic(format!(
                        "Malformed property '{}' in entity '{}'",
                        property, qualified
                    ))
                    .with_line(node.line)
                    .with_suggestion("Write properties as 'key=value'"),
                );
                continue;
            }
        };

        let value = match classify(raw) {
            AttributeLiteral::Quoted(text) => Value::text(text),
            AttributeLiteral::Boolean(b) => Value::Boolean(b),
            AttributeLiteral::Number(n) => Value::Number(n),
            AttributeLiteral::Reference(text) | AttributeLiteral::Bare(text) => Value::text(text),
        };
        properties.insert(key.to_string(), value);
    }

    (Value::Object(properties), false)
}

/// Parse an override value by the declared type of the symbol it replaces.
///
/// References are looked up with `lookup`; unbound references fall back to
/// the raw text like any other bare word.
pub fn parse_override<F>(raw: &str, declared: SymbolType, lookup: F) -> Result<Value, TenetError>
where
    F: Fn(&str) -> Option<Value>,
{
    let literal = classify(raw);
    let text = match literal {
        AttributeLiteral::Quoted(text) => return Ok(Value::text(text)),
        AttributeLiteral::Boolean(b) => return Ok(Value::Boolean(b)),
        AttributeLiteral::Number(n) => return Ok(Value::Number(n)),
        AttributeLiteral::Reference(reference) => match lookup(reference) {
            Some(value) => return Ok(value),
            None => reference,
        },
        AttributeLiteral::Bare(text) => text,
    };

    match declared {
        SymbolType::Number => parse_number(text)
            .map(Value::Number)
            .ok_or_else(|| TenetError::semantic(format!("Invalid number '{}'", text))),
        SymbolType::Boolean => Err(TenetError::semantic(format!(
            "Invalid boolean '{}'",
            text
        ))),
        _ => Ok(Value::text(text)),
    }
}

/// `namespace.name`, or `name` without a namespace
pub fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(namespace) if !namespace.is_empty() => format!("{}.{}", namespace, name),
        _ => name.to_string(),
    }
}

fn invalid_number(text: &str, qualified: &str, line: Option<usize>) -> TenetError {
    TenetError::semantic(format!(
        "Invalid number '{}' for symbol '{}'",
        text, qualified
    ))
    .with_line(line)
}

fn unresolved(reference: &str, qualified: &str, line: Option<usize>) -> TenetError {
    TenetError::semantic(format!(
        "Unresolved reference '{}' in symbol '{}'",
        reference, qualified
    ))
    .with_line(line)
    .with_suggestion("Declare the referenced symbol first, or quote the value to use it as text")
}
