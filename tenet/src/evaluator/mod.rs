//! Tree-walking evaluation engine
//!
//! Evaluates a resolved and compiled document by:
//! 1. Checking constraints from every `rules` section
//! 2. Walking the document's children in order
//! 3. Recording results, errors and trace lines on the context

pub mod aggregate;
pub mod builtins;
pub mod constructs;
pub mod context;
pub mod expression;
pub mod operations;
pub mod rules;

use crate::document::DocNode;
use crate::domain::DomainRegistry;
use crate::{TenetError, TenetResult, Value};
use constructs::Frame;
use context::{EvaluationContext, Scope};
use tracing::debug;

/// Sections whose children are evaluated
const EVALUATED_SECTIONS: [&str; 2] = ["queries", "assertions"];

/// Structural elements the traversal skips
const STRUCTURAL_TAGS: [&str; 3] = ["symbols", "rules", "import"];

const SIMULATE_SECTION: &str = "simulate";

/// Evaluates documents against a resolved symbol table and rule registry
pub struct Evaluator<'a> {
    domains: &'a DomainRegistry,
}

impl<'a> Evaluator<'a> {
    pub fn new(domains: &'a DomainRegistry) -> Self {
        Self { domains }
    }

    /// Check constraints, then evaluate the document's children in order.
    pub fn evaluate_document(
        &self,
        root: &DocNode,
        namespace: Option<&str>,
        constraints: &[String],
        scope: &Scope,
        context: &mut EvaluationContext,
    ) {
        constructs::check_constraints(constraints, context);

        let frame = Frame::new(scope.clone(), namespace);
        for child in &root.children {
            self.evaluate_node(child, &frame, context);
        }

        debug!(
            results = context.results.len(),
            errors = context.errors.len(),
            namespace = namespace.unwrap_or(""),
            "evaluated document"
        );
    }

    fn evaluate_node(&self, node: &DocNode, frame: &Frame<'_>, context: &mut EvaluationContext) {
        let tag = node.tag.as_str();
        match tag {
            _ if STRUCTURAL_TAGS.contains(&tag) => {}
            _ if EVALUATED_SECTIONS.contains(&tag) => {
                for child in &node.children {
                    self.evaluate_node(child, frame, context);
                }
            }
            SIMULATE_SECTION => {
                for child in &node.children {
                    let header = format!("simulate {} '{}'", child.tag, display_name(child));
                    let previous = context.begin_trace(header);
                    self.evaluate_node(child, frame, context);
                    context.end_trace(previous);
                }
            }
            "query" => {
                let name = result_name(node, "query", context);
                if node.attr("trace") == Some("full") && !context.is_tracing() {
                    let previous = context.begin_trace(format!("trace query '{}'", name));
                    self.record(node, &name, frame, context, constructs::query);
                    context.end_trace(previous);
                } else {
                    self.record(node, &name, frame, context, constructs::query);
                }
            }
            "exists" | "forall" => {
                let name = result_name(node, tag, context);
                self.record(node, &name, frame, context, constructs::quantifier);
            }
            "aggregate" => {
                let name = result_name(node, tag, context);
                self.record(node, &name, frame, context, aggregate::aggregate);
            }
            "assert" => constructs::assertion(node, frame, context),
            "counterfactual" | "branch" => self.counterfactual(node, frame, context),
            _ => self.dispatch_domain(node, frame, context),
        }
    }

    fn record<F>(
        &self,
        node: &DocNode,
        name: &str,
        frame: &Frame<'_>,
        context: &mut EvaluationContext,
        construct: F,
    ) where
        F: FnOnce(&DocNode, &Frame<'_>, &mut EvaluationContext) -> TenetResult<Value>,
    {
        match construct(node, frame, context) {
            Ok(value) => {
                context.trace(|| format!("{} = {}", name, value));
                context.record_result(frame.result_name(name), value);
            }
            Err(error) => context.record_error(error.with_line(node.line)),
        }
    }

    /// Evaluate the children against a scope layered with the `if` overrides.
    /// Results are recorded under the branch name, or a generated `<tag><N>`.
    fn counterfactual(&self, node: &DocNode, frame: &Frame<'_>, context: &mut EvaluationContext) {
        let overrides = constructs::parse_overrides(node, frame, context);
        context.trace(|| {
            let rendered: Vec<String> = overrides
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();
            format!("{} {}", node.tag, rendered.join(", "))
        });

        let name = result_name(node, &node.tag, context);
        let branch = Frame {
            scope: frame.scope.with_overrides(overrides),
            base: frame.base.clone(),
            namespace: frame.namespace,
            prefix: Some(frame.result_name(&name)),
        };

        for child in &node.children {
            self.evaluate_node(child, &branch, context);
        }
    }

    fn dispatch_domain(&self, node: &DocNode, frame: &Frame<'_>, context: &mut EvaluationContext) {
        let handler = match self.domains.get(&node.tag) {
            Some(handler) => handler,
            None => {
                context.record_error(
                    TenetError::semantic(format!("Unknown domain tag '{}'", node.tag))
                        .with_line(node.line)
                        .with_suggestion("Register a handler for this tag with the engine"),
                );
                return;
            }
        };

        let outcome = handler.handle(node, context.symbols);
        let name = match node.attr("name").map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("domain_{}", node.tag),
        };

        if let Some(result) = outcome.result {
            context.trace(|| format!("{} = {}", name, result));
            context.record_result(frame.result_name(&name), result);
        }
        if let Some(message) = outcome.error {
            context.record_error(TenetError::runtime(message).with_line(node.line));
        }
    }
}

/// `name` attribute, or a generated `<tag><N>`
fn result_name(node: &DocNode, tag: &str, context: &mut EvaluationContext) -> String {
    match node.attr("name").map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => context.generated_name(tag),
    }
}

fn display_name(node: &DocNode) -> &str {
    node.attr("name").unwrap_or(&node.tag)
}
