//! `aggregate` elements: count, sum, min, max and avg over a collection

use super::constructs::{collection, Frame};
use super::context::EvaluationContext;
use crate::document::DocNode;
use crate::{TenetError, TenetResult, Value};

/// Reducer named by an aggregate's `function` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl AggregateFunction {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "count" => Some(AggregateFunction::Count),
            "sum" => Some(AggregateFunction::Sum),
            "min" => Some(AggregateFunction::Min),
            "max" => Some(AggregateFunction::Max),
            "avg" => Some(AggregateFunction::Avg),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Avg => "avg",
        }
    }

    /// Reduce a non-empty slice of numbers
    pub fn apply(&self, numbers: &[f64]) -> f64 {
        match self {
            AggregateFunction::Count => numbers.len() as f64,
            AggregateFunction::Sum => numbers.iter().sum(),
            AggregateFunction::Min => numbers.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            AggregateFunction::Avg => numbers.iter().sum::<f64>() / numbers.len() as f64,
        }
    }
}

pub fn aggregate(
    node: &DocNode,
    frame: &Frame<'_>,
    context: &mut EvaluationContext,
) -> TenetResult<Value> {
    let function_name = node.attr("function").map(str::trim).unwrap_or("");
    let function = AggregateFunction::parse(function_name).ok_or_else(|| {
        TenetError::semantic(format!("Unknown aggregate function '{}'", function_name))
            .with_suggestion("Use one of: count, sum, min, max, avg")
    })?;

    let target = node.attr("target").map(str::trim).ok_or_else(|| {
        TenetError::semantic("Aggregate requires a 'target' attribute")
    })?;
    let elements = collection(target, "aggregate", frame)?;

    let numbers: Vec<f64> = elements
        .iter()
        .filter_map(Value::as_number)
        .filter(|n| !n.is_nan())
        .collect();
    if numbers.is_empty() {
        return Err(TenetError::runtime(format!(
            "Cannot {} '{}': it contains no valid numbers",
            function.name(),
            target
        )));
    }

    let result = function.apply(&numbers);
    context.trace(|| format!("{}({}) = {}", function.name(), target, Value::Number(result)));
    Ok(Value::Number(result))
}
