//! Control constructs: queries, quantifiers, assertions, constraints and
//! counterfactual overrides

use super::context::{EvaluationContext, Scope};
use super::expression::evaluate_expression;
use super::rules::run_chain;
use crate::document::DocNode;
use crate::parser::literals::split_list;
use crate::parser::{parse_expression, ParseOptions};
use crate::resolver::{parse_override, qualify};
use crate::semantic::{Expression, SymbolType, ITEM_BINDING};
use crate::{TenetError, TenetResult, Value};

/// Where a construct is evaluated: its scope, the namespace its expressions
/// are parsed in, and the prefix its results are recorded under
#[derive(Debug, Clone)]
pub struct Frame<'n> {
    pub scope: Scope,
    /// Scope the document was entered with; branch overrides never reach it
    pub base: Scope,
    pub namespace: Option<&'n str>,
    pub prefix: Option<String>,
}

impl<'n> Frame<'n> {
    pub fn new(scope: Scope, namespace: Option<&'n str>) -> Self {
        Self {
            base: scope.clone(),
            scope,
            namespace,
            prefix: namespace.map(str::to_string),
        }
    }

    /// Name under which a result is recorded
    pub fn result_name(&self, name: &str) -> String {
        qualify(self.prefix.as_deref(), name)
    }

    /// Look a name up in this frame's namespace first, then bare
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.scope
            .get(&qualify(self.namespace, name))
            .or_else(|| self.scope.get(name))
    }

    fn parse(
        &self,
        text: &str,
        context: &EvaluationContext,
        line: Option<usize>,
    ) -> TenetResult<Expression> {
        parse_expression(
            text,
            &ParseOptions::with_namespace(self.namespace),
            context.limits,
            line,
        )
    }
}

/// Elements of the collection symbol named `target`
pub fn collection(target: &str, construct: &str, frame: &Frame<'_>) -> TenetResult<Vec<Value>> {
    let value = frame.lookup(target).ok_or_else(|| {
        TenetError::runtime(format!("Unknown collection '{}' in {}", target, construct))
    })?;

    value
        .elements()
        .map(|elements| elements.into_iter().cloned().collect())
        .ok_or_else(|| {
            TenetError::runtime(format!(
                "Target '{}' of {} is a {}, not a collection",
                target,
                construct,
                value.type_name()
            ))
        })
}

/// Evaluate a `query`: its expression, or its `chain` of rules applied to
/// `target`. Set results come back as sorted lists.
pub fn query(node: &DocNode, frame: &Frame<'_>, context: &mut EvaluationContext) -> TenetResult<Value> {
    let value = match node.attr("chain") {
        Some(chain) => {
            let target = node.attr("target").map(str::trim).ok_or_else(|| {
                TenetError::semantic("Query chain requires a 'target' attribute")
                    .with_suggestion("Name the symbol the chain starts from with target=\"...\"")
            })?;
            let start = frame
                .lookup(target)
                .cloned()
                .unwrap_or_else(|| Value::text(qualify(frame.namespace, target)));
            let rule_names: Vec<String> = split_list(chain)
                .map(|name| qualify(frame.namespace, name))
                .collect();
            run_chain(&rule_names, start, &frame.scope, context)?
        }
        None => {
            let text = node.attr_or_text(&["expr"]).ok_or_else(|| {
                TenetError::semantic("Query has no expression")
                    .with_suggestion("Put the expression in the element text or an 'expr' attribute")
            })?;
            let expression = frame.parse(text, context, node.line)?;
            evaluate_expression(&expression, &frame.scope, context)?
        }
    };

    Ok(value.materialized())
}

/// Evaluate `exists` or `forall` over a collection with `item` bound to each
/// element in turn.
pub fn quantifier(
    node: &DocNode,
    frame: &Frame<'_>,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    let universal = node.tag == "forall";
    let target = node.attr("target").map(str::trim).ok_or_else(|| {
        TenetError::semantic(format!("<{}> requires a 'target' attribute", node.tag))
    })?;
    let text = node.attr_or_text(&["condition"]).ok_or_else(|| {
        TenetError::semantic(format!("<{}> requires a condition", node.tag))
            .with_suggestion("Put the condition in the element text or a 'condition' attribute")
    })?;

    let elements = collection(target, &node.tag, frame)?;
    let condition = frame.parse(text, context, node.line)?;

    let total = elements.len();
    let mut matches = 0usize;
    for element in elements {
        let scope = frame.scope.with_binding(ITEM_BINDING, element);
        if evaluate_expression(&condition, &scope, context)?.is_truthy() {
            matches += 1;
        }
    }

    let result = if universal {
        matches == total
    } else {
        matches > 0
    };
    context.trace(|| format!("{} over {}: {}/{} matched", node.tag, target, matches, total));

    if node.flag("count") {
        Ok(Value::Object(
            [
                ("result".to_string(), Value::Boolean(result)),
                ("count".to_string(), Value::Number(matches as f64)),
            ]
            .into_iter()
            .collect(),
        ))
    } else {
        Ok(Value::Boolean(result))
    }
}

/// Evaluate an `assert` against the base scope, inside branches too; a falsy
/// result is reported but evaluation goes on.
pub fn assertion(node: &DocNode, frame: &Frame<'_>, context: &mut EvaluationContext) {
    let text = match node.attr_or_text(&["expr"]) {
        Some(text) => text,
        None => {
            context.record_error(
                TenetError::semantic("Assertion has no expression").with_line(node.line),
            );
            return;
        }
    };

    let outcome = frame
        .parse(text, context, node.line)
        .and_then(|expression| evaluate_expression(&expression, &frame.base, context));

    match outcome {
        Ok(value) if value.is_truthy() => {}
        Ok(_) => {
            let message = node.attr("message").unwrap_or(text);
            context.record_error(
                TenetError::runtime(format!("Assertion failed: {}", message)).with_line(node.line),
            );
        }
        Err(error) => context.record_error(error.with_line(node.line)),
    }
}

/// Evaluate the named constraints; `error(msg)` results become runtime
/// errors with message `msg`.
pub fn check_constraints(names: &[String], context: &mut EvaluationContext) {
    let rules = context.rules;
    for name in names {
        let rule = match rules.get(name) {
            Some(rule) => rule,
            None => continue,
        };

        match evaluate_expression(&rule.expression, &rule.scope, context) {
            Ok(Value::Error(message)) => {
                context.record_error(TenetError::runtime(message).with_line(rule.line))
            }
            Ok(_) => {}
            Err(error) => context.record_error(error.with_line(rule.line)),
        }
    }
}

/// Parse `if="a=1,b=2"` into overrides typed by each symbol's declared type.
///
/// Malformed entries are reported and skipped.
pub fn parse_overrides(
    node: &DocNode,
    frame: &Frame<'_>,
    context: &mut EvaluationContext,
) -> Vec<(String, Value)> {
    let mut overrides = Vec::new();

    for entry in split_list(node.attr("if").unwrap_or("")) {
        let (name, raw) = match entry.split_once('=') {
            Some((name, raw)) if !name.trim().is_empty() => (name.trim(), raw.trim()),
            _ => {
                context.record_error(
                    TenetError::semantic(format!("Malformed override '{}'", entry))
                        .with_line(node.line)
                        .with_suggestion("Write overrides as if=\"name=value,...\""),
                );
                continue;
            }
        };

        let qualified = qualify(frame.namespace, name);
        let declared = context
            .symbols
            .get(&qualified)
            .map(|entry| entry.symbol_type)
            .unwrap_or(SymbolType::Any);

        match parse_override(raw, declared, |reference| frame.lookup(reference).cloned()) {
            Ok(value) => overrides.push((qualified, value)),
            Err(error) => context.record_error(
                TenetError::semantic(format!("Override '{}': {}", name, error.message()))
                    .with_line(node.line),
            ),
        }
    }

    overrides
}
