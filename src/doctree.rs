//! Input document model.
//!
//! A [`Node`] mirrors one element of a docutils doctree as dumped by the host
//! documentation build. Only a handful of tag names carry meaning for the
//! conversion (see [`crate::walker`]); everything else is walked through.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag name used for text leaves.
pub const TEXT_TAG: &str = "#text";

/// One node of a parsed reStructuredText document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// The docutils node class name (`document`, `paragraph`, `desc`, ...)
    pub tagname: String,
    /// Node attributes; values may be strings, lists or anything else the dump carries
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
    /// Literal text carried by this node itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an element with no attributes, text or children
    pub fn new(tagname: &str) -> Self {
        Self {
            tagname: tagname.to_string(),
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a text leaf
    pub fn text(content: &str) -> Self {
        Self {
            text: Some(content.to_string()),
            ..Self::new(TEXT_TAG)
        }
    }

    /// Create an element holding a single text leaf
    pub fn with_text(tagname: &str, content: &str) -> Self {
        Self::new(tagname).child(Node::text(content))
    }

    /// Builder-style attribute setter
    pub fn attr_str(mut self, name: &str, value: &str) -> Self {
        self.attributes
            .insert(name.to_string(), serde_json::Value::String(value.to_string()));
        self
    }

    /// Builder-style child append
    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Returns a string-valued attribute, ignoring list or numeric values
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }

    /// Concatenated text of this node and all its descendants
    pub fn astext(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(ref text) = self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }
}
