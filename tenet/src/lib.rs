//! # Tenet Engine
//!
//! **Reasoning over declarative documents**
//!
//! Tenet evaluates document trees that declare symbols, rules and queries.
//! The engine binds identifiers to typed values, compiles the embedded
//! expression language, and evaluates queries, quantifiers, aggregates,
//! assertions, constraints and counterfactual branches, returning results
//! together with every error it ran into.
//!
//! ## Quick Start
//!
//! ```rust
//! use tenet::{DocNode, Engine, Value};
//!
//! let doc = DocNode::new("document")
//!     .with_child(DocNode::new("symbols").with_child(
//!         DocNode::new("var")
//!             .with_attr("name", "age")
//!             .with_attr("type", "number")
//!             .with_attr("init", "42"),
//!     ))
//!     .with_child(DocNode::new("rules").with_child(
//!         DocNode::new("rule").with_attr("name", "isAdult").with_text("age >= 18"),
//!     ))
//!     .with_child(DocNode::new("queries").with_child(
//!         DocNode::new("query").with_attr("name", "adult").with_text("eval(isAdult)"),
//!     ));
//!
//! let result = Engine::new().evaluate(Some(&doc), None);
//! assert_eq!(result.get("adult"), Some(&Value::Boolean(true)));
//! assert!(result.errors.is_empty());
//! ```
//!
//! ## Core Concepts
//!
//! ### Symbols
//! Named, typed values declared in `symbols` sections: `var`, `const`,
//! `set`, `graph` and `entity`.
//!
//! ### Rules
//! Named expressions declared in `rules` sections. Rules can be composed
//! with `eval(name)`, called with arguments when they declare `params`, or
//! act as constraints that report `error(...)` results.
//!
//! ### Counterfactuals
//! `counterfactual` branches re-evaluate their children with some symbols
//! overridden, without affecting anything outside the branch.

pub mod ast;
pub mod compiler;
pub mod document;
pub mod domain;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod imports;
pub mod loader;
pub mod parser;
pub mod resolver;
pub mod resource_limits;
pub mod response;
pub mod semantic;
pub mod value;

pub use ast::{ExpressionId, ExpressionIdGenerator};
pub use compiler::Compiler;
pub use document::DocNode;
pub use domain::{DomainHandler, DomainOutcome, DomainRegistry};
pub use engine::Engine;
pub use error::{ErrorKind, TenetError};
pub use evaluator::context::Scope;
pub use imports::LinkedDocument;
pub use loader::{DocumentLoader, FileLoader, LoadError, LoadedDocument, MemoryLoader};
pub use parser::{parse_expression, ParseOptions};
pub use resolver::Resolver;
pub use resource_limits::ResourceLimits;
pub use response::EvalResult;
pub use semantic::*;
pub use value::{Graph, Value};

/// Result type for Tenet operations
pub type TenetResult<T> = Result<T, TenetError>;

#[cfg(test)]
mod tests;
