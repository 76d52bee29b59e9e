//! Operator semantics
//!
//! Pure functions over [`Value`]s. Arithmetic and ordering are strict about
//! operand shapes; membership and set algebra report a problem as a
//! [`RecordedError`] so the caller can log it and carry on with a fallback.

use crate::semantic::{ArithmeticOperation, ComparisonOperator, SetOperator};
use crate::{TenetError, TenetResult, Value};

/// A failed operation whose expression still produces a fallback value
pub struct RecordedError {
    pub error: TenetError,
    pub fallback: Value,
}

impl RecordedError {
    pub(crate) fn new(message: String, fallback: Value) -> Self {
        Self {
            error: TenetError::runtime(message),
            fallback,
        }
    }
}

/// Apply an arithmetic operator to two numbers.
///
/// ```text
/// 7 % 3  = 1
/// 2 ^ 10 = 1024
/// 1 / 0  -> runtime error
/// ```
pub fn arithmetic_operation(
    left: &Value,
    op: ArithmeticOperation,
    right: &Value,
) -> TenetResult<Value> {
    let (l, r) = match (left, right) {
        (Value::Number(l), Value::Number(r)) => (*l, *r),
        _ => {
            return Err(TenetError::runtime(format!(
                "Cannot apply {} to {} and {}",
                op.name(),
                left.type_name(),
                right.type_name()
            ))
            .with_suggestion("Arithmetic operators only accept numbers"))
        }
    };

    let result = match op {
        ArithmeticOperation::Add => l + r,
        ArithmeticOperation::Subtract => l - r,
        ArithmeticOperation::Multiply => l * r,
        ArithmeticOperation::Divide => {
            if r == 0.0 {
                return Err(TenetError::runtime("Division by zero"));
            }
            l / r
        }
        ArithmeticOperation::Modulo => {
            if r == 0.0 {
                return Err(TenetError::runtime("Modulo by zero"));
            }
            l % r
        }
        ArithmeticOperation::Power => l.powf(r),
    };

    Ok(Value::Number(result))
}

pub fn negate(value: &Value) -> TenetResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(-n)),
        other => Err(TenetError::runtime(format!(
            "Cannot negate {}",
            other.type_name()
        ))),
    }
}

/// Compare two values.
///
/// Equality works on any pair of values; ordering needs two numbers or two
/// texts.
pub fn comparison_operation(
    left: &Value,
    op: ComparisonOperator,
    right: &Value,
) -> TenetResult<Value> {
    let result = match op {
        ComparisonOperator::Equal => left.loose_eq(right),
        ComparisonOperator::NotEqual => !left.loose_eq(right),
        _ => match (left, right) {
            (Value::Number(l), Value::Number(r)) => ordered(l, op, r),
            (Value::Text(l), Value::Text(r)) => ordered(l, op, r),
            _ => {
                return Err(TenetError::runtime(format!(
                    "Cannot compare {} {} {}",
                    left.type_name(),
                    op.symbol(),
                    right.type_name()
                )))
            }
        },
    };
    Ok(Value::Boolean(result))
}

fn ordered<T: PartialOrd + ?Sized>(l: &T, op: ComparisonOperator, r: &T) -> bool {
    match op {
        ComparisonOperator::GreaterThan => l > r,
        ComparisonOperator::LessThan => l < r,
        ComparisonOperator::GreaterThanOrEqual => l >= r,
        ComparisonOperator::LessThanOrEqual => l <= r,
        ComparisonOperator::Equal => l == r,
        ComparisonOperator::NotEqual => l != r,
    }
}

/// `needle in haystack`
pub fn membership(needle: &Value, haystack: &Value) -> Result<Value, RecordedError> {
    match haystack {
        Value::Set(_) | Value::List(_) => {
            let found = haystack
                .elements()
                .is_some_and(|elements| elements.into_iter().any(|e| e.loose_eq(needle)));
            Ok(Value::Boolean(found))
        }
        Value::Text(text) => match needle {
            Value::Text(part) => Ok(Value::Boolean(text.contains(part.as_str()))),
            other => Err(RecordedError::new(
                format!("Cannot test {} for membership in a string", other.type_name()),
                Value::Boolean(false),
            )),
        },
        other => Err(RecordedError::new(
            format!("'in' expects a set, list or string, got {}", other.type_name()),
            Value::Boolean(false),
        )),
    }
}

pub fn set_operation(left: &Value, op: SetOperator, right: &Value) -> Result<Value, RecordedError> {
    let (l, r) = match (left, right) {
        (Value::Set(l), Value::Set(r)) => (l, r),
        _ => {
            return Err(RecordedError::new(
                format!(
                    "'{}' needs two sets, got {} and {}",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                ),
                Value::Null,
            ))
        }
    };

    let result = match op {
        SetOperator::Union => l.union(r).cloned().collect(),
        SetOperator::Intersect => l.intersection(r).cloned().collect(),
        SetOperator::Diff => l.difference(r).cloned().collect(),
    };
    Ok(Value::Set(result))
}
