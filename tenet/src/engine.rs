use crate::document::DocNode;
use crate::domain::{DomainHandler, DomainRegistry};
use crate::evaluator::context::EvaluationContext;
use crate::evaluator::Evaluator;
use crate::imports::{LinkedDocument, Linker};
use crate::loader::{DocumentLoader, FileLoader};
use crate::parser::{parse_expression, ParseOptions};
use crate::semantic::Expression;
use crate::{EvalResult, ResourceLimits, TenetError, TenetResult};
use std::sync::Arc;
use tracing::debug;

/// The Tenet evaluation engine.
///
/// Takes a document tree through import linking, symbol resolution, rule
/// compilation and evaluation. The engine holds no per-document state, so
/// one engine can evaluate many documents, concurrently if need be.
#[derive(Clone)]
pub struct Engine {
    limits: ResourceLimits,
    domains: DomainRegistry,
    loader: Arc<dyn DocumentLoader>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            limits: ResourceLimits::default(),
            domains: DomainRegistry::default(),
            loader: Arc::new(FileLoader::new()),
        }
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom resource limits
    pub fn with_limits(limits: ResourceLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Use `domains` for tags the engine does not understand
    pub fn with_domains(mut self, domains: DomainRegistry) -> Self {
        self.domains = domains;
        self
    }

    /// Retrieve imported documents through `loader`
    pub fn with_loader<L>(mut self, loader: L) -> Self
    where
        L: DocumentLoader + 'static,
    {
        self.loader = Arc::new(loader);
        self
    }

    pub fn register_domain<H>(&mut self, tag: impl Into<String>, handler: H)
    where
        H: DomainHandler + 'static,
    {
        self.domains.register(tag, handler);
    }

    /// Get the current resource limits
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn domains(&self) -> &DomainRegistry {
        &self.domains
    }

    /// Evaluate a document tree.
    ///
    /// `source` identifies the document for import resolution and cycle
    /// detection. A missing tree yields an empty result with one error.
    pub fn evaluate(&self, doc: Option<&DocNode>, source: Option<&str>) -> EvalResult {
        let root = match self.check_document(doc) {
            Ok(root) => root,
            Err(error) => return EvalResult::from_error(error),
        };

        let LinkedDocument {
            symbols,
            rules,
            errors,
            constraints,
            full_scope,
        } = self.link_checked(root, source);

        let scope = symbols.scope();
        let mut context = EvaluationContext::new(&symbols, &rules, &self.limits);
        context.errors = errors;

        let evaluator = Evaluator::new(&self.domains);
        for import in &full_scope {
            evaluator.evaluate_document(
                &import.root,
                import.namespace.as_deref(),
                &import.constraints,
                &scope,
                &mut context,
            );
        }
        evaluator.evaluate_document(root, None, &constraints, &scope, &mut context);

        let trace = context.take_trace();
        debug!(
            results = context.results.len(),
            errors = context.errors.len(),
            trace = trace.len(),
            "evaluation finished"
        );
        EvalResult {
            results: context.results,
            errors: context.errors,
            trace,
        }
    }

    /// Link, resolve and compile without evaluating anything
    pub fn link(&self, doc: Option<&DocNode>, source: Option<&str>) -> LinkedDocument {
        match self.check_document(doc) {
            Ok(root) => self.link_checked(root, source),
            Err(error) => LinkedDocument {
                errors: vec![error],
                ..LinkedDocument::default()
            },
        }
    }

    /// Parse a standalone expression, optionally inside a namespace
    pub fn compile_expression(
        &self,
        text: &str,
        namespace: Option<&str>,
    ) -> TenetResult<Expression> {
        parse_expression(text, &ParseOptions::with_namespace(namespace), &self.limits, None)
    }

    fn check_document<'d>(&self, doc: Option<&'d DocNode>) -> TenetResult<&'d DocNode> {
        let root = doc.ok_or_else(|| TenetError::semantic("Document tree is null"))?;

        let nodes = root.node_count();
        if nodes > self.limits.max_document_nodes {
            return Err(TenetError::semantic(format!(
                "Document has {} nodes, exceeding the maximum of {}",
                nodes, self.limits.max_document_nodes
            ))
            .with_suggestion("Split the document and import the parts"));
        }
        Ok(root)
    }

    fn link_checked(&self, root: &DocNode, source: Option<&str>) -> LinkedDocument {
        let id = source.map(|source| self.loader.canonical_id(source));
        let chain: Vec<String> = id.iter().cloned().collect();
        debug!(source = ?id, "linking document");

        Linker::new(self.loader.as_ref(), &self.limits).link(root, id.as_deref(), None, chain)
    }
}
