use crate::{TenetError, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of evaluating a document
///
/// Contains every recorded result, all errors in the order they were
/// raised, and the execution trace. Partial results are kept even when
/// errors occurred.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvalResult {
    pub results: BTreeMap<String, Value>,
    pub errors: Vec<TenetError>,
    pub trace: Vec<String>,
}

impl EvalResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty result carrying a single error
    pub fn from_error(error: TenetError) -> Self {
        Self {
            errors: vec![error],
            ..Self::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.results.get(name)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Error messages, in order
    pub fn error_messages(&self) -> Vec<&str> {
        self.errors.iter().map(TenetError::message).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
