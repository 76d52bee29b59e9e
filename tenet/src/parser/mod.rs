use crate::ast::ExpressionIdGenerator;
use crate::error::TenetError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::Expression;
use pest::Parser;
use pest_derive::Parser;
use std::borrow::Cow;

pub mod expressions;
pub mod literals;

#[derive(Parser)]
#[grammar = "src/parser/expression.pest"]
pub struct TenetParser;

/// How identifiers in an expression are qualified
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions<'a> {
    /// Namespace prefixed to identifiers and call targets
    pub namespace: Option<&'a str>,
    /// Declared parameters, which are never qualified
    pub parameters: &'a [String],
}

impl<'a> ParseOptions<'a> {
    pub fn with_namespace(namespace: Option<&'a str>) -> Self {
        Self {
            namespace,
            parameters: &[],
        }
    }
}

/// Parse an expression into an expression tree.
///
/// `line` is the source line of the node the text came from; every node of
/// the resulting tree carries it for diagnostics.
pub fn parse_expression(
    text: &str,
    options: &ParseOptions<'_>,
    limits: &ResourceLimits,
    line: Option<usize>,
) -> Result<Expression, TenetError> {
    let source = expand_implicit_multiplication(text);
    if source.trim().is_empty() {
        return Err(TenetError::syntax("Empty expression").with_line(line));
    }

    let nesting = estimate_nesting(&source);
    if nesting > limits.max_expression_depth {
        return Err(TenetError::syntax(format!(
            "Expression nesting of {} exceeds the maximum depth of {}",
            nesting, limits.max_expression_depth
        ))
        .with_line(line)
        .with_suggestion("Split the expression into smaller rules"));
    }

    let mut pairs = TenetParser::parse(Rule::expression_input, &source)
        .map_err(|e| convert_pest_error(e, &source).with_line(line))?;

    let expression_pair = pairs
        .next()
        .and_then(|input| input.into_inner().find(|p| p.as_rule() == Rule::expression))
        .ok_or_else(|| TenetError::syntax("Empty expression").with_line(line))?;

    let mut id_gen = ExpressionIdGenerator::with_max_depth(limits.max_expression_depth);
    let mut builder = expressions::ExpressionBuilder::new(options, &mut id_gen, line);
    builder.build(expression_pair)
}

/// Rewrite a number directly followed by a name (`2x`) as a product (`2*x`).
///
/// Quoted text and digits inside identifiers (`x2y`) are left alone.
pub fn expand_implicit_multiplication(text: &str) -> Cow<'_, str> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 4);
    let mut quote: Option<char> = None;
    let mut changed = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
            out.push(c);
            i += 1;
            continue;
        }

        let starts_token = i == 0 || !is_ident_char(chars[i - 1]);
        if c.is_ascii_digit() && starts_token {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            out.extend(&chars[start..i]);
            if i < chars.len() && (chars[i].is_ascii_alphabetic() || chars[i] == '_') {
                out.push('*');
                changed = true;
            }
            continue;
        }

        out.push(c);
        i += 1;
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Upper bound on the recursion the grammar needs: open parentheses,
/// right-nested powers and the longest run of prefix operators, outside quotes.
fn estimate_nesting(text: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut powers = 0usize;
    let mut prefix_run = 0usize;
    let mut max_prefix_run = 0usize;

    for c in text.chars() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '!') | (None, '-') => {
                prefix_run += 1;
                max_prefix_run = max_prefix_run.max(prefix_run);
                continue;
            }
            (None, c) if c.is_whitespace() => continue,
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            (None, ')') => depth = depth.saturating_sub(1),
            (None, '^') => powers += 1,
            _ => {}
        }
        prefix_run = 0;
    }

    max_depth + powers + max_prefix_run
}

fn convert_pest_error(error: pest::error::Error<Rule>, source: &str) -> TenetError {
    let position = match error.location {
        pest::error::InputLocation::Pos(pos) => pos,
        pest::error::InputLocation::Span((start, _)) => start,
    };
    let column = match error.line_col {
        pest::error::LineColLocation::Pos((_, col)) => col,
        pest::error::LineColLocation::Span((_, col), _) => col,
    };

    let remainder = source.get(position..).unwrap_or("");
    match remainder.chars().next() {
        None => TenetError::syntax(format!("Unexpected end of expression '{}'", source.trim()))
            .with_suggestion("Check for unbalanced parentheses or a missing operand"),
        Some(c) if !is_supported_char(c) => TenetError::syntax(format!(
            "Unsupported character '{}' at column {} in '{}'",
            c,
            column,
            source.trim()
        )),
        Some(_) => TenetError::syntax(format!(
            "Unexpected token '{}' at column {} in '{}'",
            remainder.split_whitespace().next().unwrap_or(remainder),
            column,
            source.trim()
        ))
        .with_suggestion(error.variant.message().to_string()),
    }
}

fn is_supported_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '_' | '.' | ',' | '(' | ')' | '"' | '\'' | '&' | '|' | '!' | '=' | '<' | '>' | '+'
                | '-' | '*' | '/' | '%' | '^'
        )
}
