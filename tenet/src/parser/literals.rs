use crate::error::TenetError;
use crate::parser::Rule;
use crate::Value;
use pest::iterators::Pair;
use regex::Regex;
use std::sync::OnceLock;

pub(crate) fn parse_literal(pair: Pair<Rule>) -> Result<Value, TenetError> {
    match pair.as_rule() {
        Rule::number => parse_number_literal(pair),
        Rule::string => parse_string_literal(pair),
        Rule::boolean => parse_boolean_literal(pair),
        other => Err(TenetError::syntax(format!(
            "Unsupported literal type: {:?}",
            other
        ))),
    }
}

fn parse_number_literal(pair: Pair<Rule>) -> Result<Value, TenetError> {
    pair.as_str()
        .parse::<f64>()
        .map(Value::Number)
        .map_err(|_| TenetError::syntax(format!("Invalid number literal '{}'", pair.as_str())))
}

fn parse_string_literal(pair: Pair<Rule>) -> Result<Value, TenetError> {
    // string = ${ quote ~ inner ~ quote }; the inner pair holds the unquoted text
    let content = pair
        .into_inner()
        .next()
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default();
    Ok(Value::Text(content))
}

fn parse_boolean_literal(pair: Pair<Rule>) -> Result<Value, TenetError> {
    match pair.as_str() {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        other => Err(TenetError::syntax(format!(
            "Invalid boolean: '{}'. Expected one of: true, false",
            other
        ))),
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z_][\w.]*$").expect("valid reference pattern"))
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^-?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("valid number pattern")
    })
}

/// Shape of a literal written in an attribute value or inline text
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeLiteral<'a> {
    /// Text in matching single or double quotes (quotes removed)
    Quoted(&'a str),
    Boolean(bool),
    Number(f64),
    /// Bare identifier such as `threshold` or `config.limit`
    Reference(&'a str),
    /// Anything else, trimmed
    Bare(&'a str),
}

/// Classify an attribute value as a literal or a symbol reference.
pub fn classify(text: &str) -> AttributeLiteral<'_> {
    let text = text.trim();
    if let Some(inner) = unquote(text) {
        return AttributeLiteral::Quoted(inner);
    }
    match text {
        "true" => return AttributeLiteral::Boolean(true),
        "false" => return AttributeLiteral::Boolean(false),
        _ => {}
    }
    if number_pattern().is_match(text) {
        if let Ok(n) = text.parse::<f64>() {
            return AttributeLiteral::Number(n);
        }
    }
    if reference_pattern().is_match(text) {
        return AttributeLiteral::Reference(text);
    }
    AttributeLiteral::Bare(text)
}

/// Strip one pair of matching quotes, if present
pub fn unquote(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' || first == b'\'') && first == last {
            return Some(&text[1..text.len() - 1]);
        }
    }
    None
}

/// Whether `text` is a valid (possibly dot-qualified) identifier
pub fn is_identifier(text: &str) -> bool {
    reference_pattern().is_match(text)
}

/// Parse a number the way numeric attributes are read; `None` on failure.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if number_pattern().is_match(text) {
        text.parse::<f64>().ok()
    } else {
        None
    }
}

/// Split a comma-separated attribute list, dropping empty entries.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|item| !item.is_empty())
}
