// Parser tests
mod expression_parsing;

mod resolver;



use crate::semantic::{Expression, ExpressionKind};
use crate::Value;

/// Render an expression tree fully parenthesized, for precedence checks
pub(crate) fn render(expr: &Expression) -> String {
    match &expr.kind {
        ExpressionKind::Literal(Value::Text(text)) => format!("\"{}\"", text),
        ExpressionKind::Literal(value) => value.to_string(),
        ExpressionKind::Reference(name) => name.clone(),
        ExpressionKind::Arithmetic(l, op, r) => {
            format!("({} {} {})", render(l), op.symbol(), render(r))
        }
        ExpressionKind::Comparison(l, op, r) => {
            format!("({} {} {})", render(l), op.symbol(), render(r))
        }
        ExpressionKind::Logical(l, op, r) => {
            format!("({} {} {})", render(l), op.symbol(), render(r))
        }
        ExpressionKind::SetOperation(l, op, r) => {
            format!("({} {} {})", render(l), op.symbol(), render(r))
        }
        ExpressionKind::Membership(needle, haystack) => {
            format!("({} in {})", render(needle), render(haystack))
        }
        ExpressionKind::Negation(operand) => format!("(-{})", render(operand)),
        ExpressionKind::LogicalNegation(operand) => format!("(!{})", render(operand)),
        ExpressionKind::FunctionCall(call) => {
            let arguments: Vec<String> = call.arguments.iter().map(render).collect();
            format!("{}({})", call.name, arguments.join(", "))
        }
    }
}
