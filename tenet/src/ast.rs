//! AST infrastructure types
//!
//! This module contains metadata types used throughout the parser and compiler:
//! - `ExpressionId` for uniquely identifying expression nodes
//! - `ExpressionIdGenerator` for generating unique IDs and bounding nesting depth

use std::fmt;

/// Unique identifier for each expression in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpressionId(u64);

impl ExpressionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expr_{}", self.0)
    }
}

/// Counter for generating unique expression IDs
///
/// Also tracks how deeply the builder has descended, so pathological input
/// is rejected before it can exhaust the stack.
#[derive(Debug)]
pub struct ExpressionIdGenerator {
    next_id: u64,
    depth: usize,
    max_depth: usize,
}

impl Default for ExpressionIdGenerator {
    fn default() -> Self {
        Self {
            next_id: 0,
            depth: 0,
            max_depth: usize::MAX,
        }
    }
}

impl ExpressionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn next_id(&mut self) -> ExpressionId {
        let id = ExpressionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Enter one nesting level; fails once `max_depth` would be exceeded.
    pub fn push_depth(&mut self) -> Result<(), usize> {
        if self.depth >= self.max_depth {
            return Err(self.depth + 1);
        }
        self.depth += 1;
        Ok(())
    }

    pub fn pop_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
