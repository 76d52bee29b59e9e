//! Evaluation context for executing document constructs
//!
//! Contains all state needed during evaluation of a single document.

use crate::error::TenetError;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{RuleRegistry, SymbolTable};
use crate::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A name → value view used while evaluating expressions
///
/// The base snapshot is shared and never mutated; derived scopes (function
/// parameters, quantifier bindings, counterfactual overrides) own only their
/// overrides. Creating a derived scope cannot affect the scope it came from.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    base: Arc<BTreeMap<String, Value>>,
    overrides: BTreeMap<String, Value>,
}

impl Scope {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Self {
            base: Arc::new(values),
            overrides: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.overrides.get(name).or_else(|| self.base.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Derive a scope with one extra binding
    pub fn with_binding(&self, name: impl Into<String>, value: Value) -> Scope {
        let mut derived = self.clone();
        derived.overrides.insert(name.into(), value);
        derived
    }

    /// Derive a scope layered with `overrides`; later entries win.
    pub fn with_overrides<I>(&self, overrides: I) -> Scope
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut derived = self.clone();
        derived.overrides.extend(overrides);
        derived
    }

    /// Whether two scopes share the same base snapshot
    pub fn shares_base(&self, other: &Scope) -> bool {
        Arc::ptr_eq(&self.base, &other.base)
    }
}

/// Context for evaluating a document
///
/// Contains all state needed for a single evaluation:
/// - Symbols and compiled rules (read-only)
/// - Results and errors recorded so far
/// - Trace buffers
pub struct EvaluationContext<'a> {
    pub symbols: &'a SymbolTable,
    pub rules: &'a RuleRegistry,
    pub limits: &'a ResourceLimits,

    /// Results recorded by queries and other constructs
    pub results: BTreeMap<String, Value>,

    /// Errors in the order they were raised
    pub errors: Vec<TenetError>,

    /// Main trace: one header line per traced construct
    pub trace_log: Vec<String>,

    /// Finished private buffers, in declaration order
    pub trace_buffers: Vec<Vec<String>>,

    /// Buffer of the construct currently being traced
    active_trace: Option<Vec<String>>,

    /// Counters for generated names (`query1`, `exists2`, ...)
    generated_names: BTreeMap<String, usize>,

    depth: usize,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(
        symbols: &'a SymbolTable,
        rules: &'a RuleRegistry,
        limits: &'a ResourceLimits,
    ) -> Self {
        Self {
            symbols,
            rules,
            limits,
            results: BTreeMap::new(),
            errors: Vec::new(),
            trace_log: Vec::new(),
            trace_buffers: Vec::new(),
            active_trace: None,
            generated_names: BTreeMap::new(),
            depth: 0,
        }
    }

    /// Record a non-fatal error and keep going
    pub fn record_error(&mut self, error: TenetError) {
        self.errors.push(error);
    }

    pub fn record_result(&mut self, name: impl Into<String>, value: Value) {
        self.results.insert(name.into(), value);
    }

    pub fn is_tracing(&self) -> bool {
        self.active_trace.is_some()
    }

    /// Append a trace line; the message is only built while tracing.
    pub fn trace<F>(&mut self, message: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(buffer) = self.active_trace.as_mut() {
            buffer.push(message());
        }
    }

    /// Start a private trace buffer under a header line in the main trace.
    ///
    /// Returns the buffer that was active before, to hand back to
    /// [`EvaluationContext::end_trace`].
    pub fn begin_trace(&mut self, header: String) -> Option<Vec<String>> {
        self.trace_log.push(header);
        self.active_trace.replace(Vec::new())
    }

    pub fn end_trace(&mut self, previous: Option<Vec<String>>) {
        if let Some(buffer) = std::mem::replace(&mut self.active_trace, previous) {
            self.trace_buffers.push(buffer);
        }
    }

    /// Next generated name for an unnamed construct (`query1`, `query2`, ...)
    pub fn generated_name(&mut self, prefix: &str) -> String {
        let counter = self.generated_names.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{}{}", prefix, counter)
    }

    /// Enter one level of expression or call nesting
    pub fn enter(&mut self, line: Option<usize>) -> Result<(), TenetError> {
        if self.depth >= self.limits.max_evaluation_depth {
            return Err(TenetError::runtime(format!(
                "Evaluation depth exceeds the maximum of {}",
                self.limits.max_evaluation_depth
            ))
            .with_line(line)
            .with_suggestion("Check for rules that evaluate themselves through eval()"));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Final trace: main trace followed by the private buffers
    pub fn take_trace(&mut self) -> Vec<String> {
        let mut trace = std::mem::take(&mut self.trace_log);
        for buffer in self.trace_buffers.drain(..) {
            trace.extend(buffer);
        }
        trace
    }
}
