//! Builtin functions: `error`, `path` and `eval`

use super::context::{EvaluationContext, Scope};
use super::expression::evaluate_expression;
use super::operations::RecordedError;
use crate::{TenetResult, Value};

/// `error(msg)`: an error marker that constraints turn into runtime errors
pub fn error(arguments: &[Value]) -> Value {
    let message = match arguments.first() {
        Some(Value::Text(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => "error".to_string(),
    };
    Value::Error(message)
}

/// `path(graph, from, to)`: shortest path by breadth-first search, `null`
/// when unreachable
pub fn path(arguments: &[Value]) -> Result<Value, RecordedError> {
    let (graph, from, to) = match arguments {
        [Value::Graph(graph), Value::Text(from), Value::Text(to)] => (graph, from, to),
        [_, _, _] => {
            let shapes: Vec<&str> = arguments.iter().map(Value::type_name).collect();
            return Err(RecordedError::new(
                format!(
                    "path() expects (graph, string, string), got ({})",
                    shapes.join(", ")
                ),
                Value::Null,
            ));
        }
        _ => {
            return Err(RecordedError::new(
                format!("path() expects 3 arguments, got {}", arguments.len()),
                Value::Null,
            ))
        }
    };

    Ok(match graph.shortest_path(from, to) {
        Some(nodes) => Value::List(nodes.into_iter().map(Value::Text).collect()),
        None => Value::Null,
    })
}

/// `eval(x)`: when `x` names a compiled rule, evaluate that rule's
/// expression in the caller's scope; anything else passes through.
pub fn eval(
    arguments: &[Value],
    scope: &Scope,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    let target = match arguments.first() {
        Some(value) => value,
        None => return Ok(Value::Null),
    };

    let rules = context.rules;
    let expression = match target {
        Value::Text(name) => rules.expression(name),
        _ => None,
    };

    match expression {
        Some(expression) => evaluate_expression(expression, scope, context),
        None => Ok(target.clone()),
    }
}
