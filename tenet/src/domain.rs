//! Domain tag handlers
//!
//! Tags the engine does not understand are offered to a [`DomainRegistry`]
//! passed in by the caller. Handlers see the node and the resolved symbol
//! table and report a result, an error, or both. They are treated as opaque
//! pure functions.

use crate::document::DocNode;
use crate::semantic::SymbolTable;
use crate::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a domain handler produced for one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainOutcome {
    pub result: Option<Value>,
    pub error: Option<String>,
}

impl DomainOutcome {
    pub fn result(value: impl Into<Value>) -> Self {
        Self {
            result: Some(value.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }
}

/// Evaluates one kind of domain tag
pub trait DomainHandler: Send + Sync {
    fn handle(&self, node: &DocNode, symbols: &SymbolTable) -> DomainOutcome;
}

impl<F> DomainHandler for F
where
    F: Fn(&DocNode, &SymbolTable) -> DomainOutcome + Send + Sync,
{
    fn handle(&self, node: &DocNode, symbols: &SymbolTable) -> DomainOutcome {
        self(node, symbols)
    }
}

/// Tag → handler lookup
#[derive(Clone, Default)]
pub struct DomainRegistry {
    handlers: BTreeMap<String, Arc<dyn DomainHandler>>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `tag`, replacing any previous handler.
    pub fn register<H>(&mut self, tag: impl Into<String>, handler: H)
    where
        H: DomainHandler + 'static,
    {
        self.handlers.insert(tag.into(), Arc::new(handler));
    }

    pub fn with_handler<H>(mut self, tag: impl Into<String>, handler: H) -> Self
    where
        H: DomainHandler + 'static,
    {
        self.register(tag, handler);
        self
    }

    pub fn get(&self, tag: &str) -> Option<&dyn DomainHandler> {
        self.handlers.get(tag).map(|handler| handler.as_ref())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.handlers.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl fmt::Debug for DomainRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainRegistry")
            .field("tags", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
