//! Expression evaluation
//!
//! Recursively evaluates expression trees against a [`Scope`].

use super::context::{EvaluationContext, Scope};
use super::operations::{self, RecordedError};
use super::{builtins, rules};
use crate::semantic::{Expression, ExpressionKind, LogicalOperator};
use crate::{TenetResult, Value};

/// Evaluate an expression to a value
///
/// Errors returned here abort the enclosing construct. Problems that still
/// leave a usable value (bad `in` operand, set algebra on non-sets, bad
/// `path` arguments) are recorded on the context instead.
pub fn evaluate_expression(
    expr: &Expression,
    scope: &Scope,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    context.enter(expr.line)?;
    let result = evaluate_kind(expr, scope, context).map_err(|e| match e.line() {
        Some(_) => e,
        None => e.with_line(expr.line),
    });
    context.leave();
    result
}

fn evaluate_kind(
    expr: &Expression,
    scope: &Scope,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    match &expr.kind {
        ExpressionKind::Literal(value) => Ok(value.clone()),

        ExpressionKind::Reference(name) => {
            let value = scope
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::text(name.as_str()));
            context.trace(|| format!("{} = {}", name, value));
            Ok(value)
        }

        ExpressionKind::Arithmetic(left, op, right) => {
            let l = evaluate_expression(left, scope, context)?;
            let r = evaluate_expression(right, scope, context)?;
            let result = operations::arithmetic_operation(&l, *op, &r)?;
            context.trace(|| format!("{} {} {} = {}", l, op.symbol(), r, result));
            Ok(result)
        }

        ExpressionKind::Comparison(left, op, right) => {
            let l = evaluate_expression(left, scope, context)?;
            let r = evaluate_expression(right, scope, context)?;
            let result = operations::comparison_operation(&l, *op, &r)?;
            context.trace(|| format!("{} {} {} = {}", l, op.symbol(), r, result));
            Ok(result)
        }

        ExpressionKind::Logical(left, op, right) => {
            let l = evaluate_expression(left, scope, context)?;
            let result = match op {
                LogicalOperator::And if !l.is_truthy() => Value::Boolean(false),
                LogicalOperator::Or if l.is_truthy() => Value::Boolean(true),
                LogicalOperator::Implies if !l.is_truthy() => Value::Boolean(true),
                LogicalOperator::And | LogicalOperator::Or => {
                    Value::Boolean(evaluate_expression(right, scope, context)?.is_truthy())
                }
                LogicalOperator::Implies => evaluate_expression(right, scope, context)?,
                LogicalOperator::Iff => {
                    let r = evaluate_expression(right, scope, context)?;
                    Value::Boolean(l.is_truthy() == r.is_truthy())
                }
            };
            context.trace(|| format!("{} {} ... = {}", l, op.symbol(), result));
            Ok(result)
        }

        ExpressionKind::SetOperation(left, op, right) => {
            let l = evaluate_expression(left, scope, context)?;
            let r = evaluate_expression(right, scope, context)?;
            let result = recover(operations::set_operation(&l, *op, &r), expr, context);
            context.trace(|| format!("{} {} {} = {}", l, op.symbol(), r, result));
            Ok(result)
        }

        ExpressionKind::Membership(needle, haystack) => {
            let n = evaluate_expression(needle, scope, context)?;
            let h = evaluate_expression(haystack, scope, context)?;
            let result = recover(operations::membership(&n, &h), expr, context);
            context.trace(|| format!("{} in {} = {}", n, h, result));
            Ok(result)
        }

        ExpressionKind::Negation(operand) => {
            let value = evaluate_expression(operand, scope, context)?;
            let result = operations::negate(&value)?;
            context.trace(|| format!("-{} = {}", value, result));
            Ok(result)
        }

        ExpressionKind::LogicalNegation(operand) => {
            let value = evaluate_expression(operand, scope, context)?;
            let result = Value::Boolean(!value.is_truthy());
            context.trace(|| format!("!{} = {}", value, result));
            Ok(result)
        }

        ExpressionKind::FunctionCall(call) => {
            let mut arguments = Vec::with_capacity(call.arguments.len());
            for argument in &call.arguments {
                arguments.push(evaluate_expression(argument, scope, context)?);
            }

            let result = match call.name.as_str() {
                "error" => builtins::error(&arguments),
                "path" => recover(builtins::path(&arguments), expr, context),
                "eval" => builtins::eval(&arguments, scope, context)?,
                name => rules::call_rule(name, &arguments, context)?,
            };

            context.trace(|| {
                let rendered: Vec<String> = arguments.iter().map(Value::to_string).collect();
                format!("{}({}) = {}", call.name, rendered.join(", "), result)
            });
            Ok(result)
        }
    }
}

/// Log a recorded error and continue with its fallback value
fn recover(
    outcome: Result<Value, RecordedError>,
    expr: &Expression,
    context: &mut EvaluationContext,
) -> Value {
    match outcome {
        Ok(value) => value,
        Err(recorded) => {
            context.record_error(recorded.error.with_line(expr.line));
            recorded.fallback
        }
    }
}
