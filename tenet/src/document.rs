//! Document tree consumed by the engine
//!
//! The outer markup layer turns raw document text into this generic
//! attributed tree. The engine never re-tokenizes markup; it only interprets
//! tags structurally. Trees can be built in code or deserialized from JSON:
//!
//! ```json
//! {"tag": "var", "attributes": {"name": "age", "type": "number", "init": "42"}, "line": 3}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the document tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DocNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl DocNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
            line: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: DocNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DocNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed, non-empty text content
    pub fn text_content(&self) -> Option<&str> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// First present attribute among `names`, falling back to text content
    pub fn attr_or_text(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| self.attr(name))
            .or_else(|| self.text_content())
    }

    /// Whether an attribute is set to a truthy flag value
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.attr(name), Some("true") | Some("yes") | Some("1"))
    }

    /// Depth-first search for every descendant (including `self`) with `tag`,
    /// in document order
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a DocNode> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.tag == tag {
                found.push(node);
            }
            pending.extend(node.children.iter().rev());
        }
        found
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(&node.children);
        }
        count
    }
}

impl Drop for DocNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
