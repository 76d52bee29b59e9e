//! Rule and function calls, and rule chains

use super::context::{EvaluationContext, Scope};
use super::expression::evaluate_expression;
use crate::semantic::{CompiledRule, ITEM_BINDING};
use crate::{TenetError, TenetResult, Value};

/// Call a compiled rule or function by name.
///
/// Arguments bind positionally over the rule's captured scope; missing
/// arguments bind `null`.
pub fn call_rule(
    name: &str,
    arguments: &[Value],
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    let rules = context.rules;
    let rule = rules.get(name).ok_or_else(|| {
        TenetError::runtime(format!("Unknown function '{}'", name))
            .with_suggestion("Declare it as a <function> or <rule> in a rules section")
    })?;

    let scope = bind_parameters(rule, arguments)?;
    evaluate_expression(&rule.expression, &scope, context)
}

fn bind_parameters(rule: &CompiledRule, arguments: &[Value]) -> TenetResult<Scope> {
    if arguments.len() > rule.parameters.len() {
        return Err(TenetError::runtime(format!(
            "{} '{}' takes {} argument(s) but {} were given",
            capitalize(rule.kind.name()),
            rule.name,
            rule.parameters.len(),
            arguments.len()
        )));
    }

    let mut bindings = Vec::with_capacity(rule.parameters.len());
    for (index, parameter) in rule.parameters.iter().enumerate() {
        let value = arguments.get(index).cloned().unwrap_or(Value::Null);
        if index < arguments.len() && !parameter.param_type.accepts(&value) {
            return Err(TenetError::runtime(format!(
                "Argument '{}' of '{}' expects {}, got {}",
                parameter.name,
                rule.name,
                parameter.param_type,
                value.type_name()
            )));
        }
        bindings.push((parameter.name.clone(), value));
    }

    Ok(rule.scope.with_overrides(bindings))
}

/// Thread `start` through each named rule, binding the previous result to
/// `item` (and to the rule's first parameter, when it declares one).
pub fn run_chain(
    rule_names: &[String],
    start: Value,
    scope: &Scope,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    let rules = context.rules;
    let mut current = start;

    for name in rule_names {
        let rule = rules.get(name).ok_or_else(|| {
            TenetError::runtime(format!("Unknown rule '{}' in chain", name))
        })?;

        let mut step_scope = scope.with_binding(ITEM_BINDING, current.clone());
        if let Some(parameter) = rule.parameters.first() {
            step_scope = step_scope.with_binding(parameter.name.clone(), current.clone());
        }

        let next = evaluate_expression(&rule.expression, &step_scope, context)?;
        context.trace(|| format!("chain {}({}) = {}", name, current, next));
        current = next;
    }

    Ok(current)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
