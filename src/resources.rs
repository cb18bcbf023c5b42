//! Resource hierarchy construction.
//!
//! Methods are registered against flat path strings while the document is
//! walked. Once the walk is over, [`ResourceTree::build`] folds those paths into
//! the nested `resource` hierarchy WADL expects.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Insertion-ordered mapping from normalized path template to method ids.
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `method_id` to the ids registered under `path`
    pub fn register(&mut self, path: &str, method_id: &str) {
        let slot = match self.index.get(path) {
            Some(&slot) => slot,
            None => {
                self.entries.push((path.to_string(), Vec::new()));
                self.index.insert(path.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1.push(method_id.to_string());
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.index
            .get(path)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Paths in the order they were first registered
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, ids)| (path.as_str(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One path segment in the resource hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Segment text, possibly a `{variable}` placeholder
    pub segment: String,
    /// Ids of the methods defined at exactly this path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceNode>,
}

impl ResourceNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            methods: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Resource id: the segment without placeholder braces
    pub fn id(&self) -> String {
        self.segment.replace(['{', '}'], "")
    }

    /// Child for `segment`, if one exists
    pub fn child(&self, segment: &str) -> Option<&ResourceNode> {
        self.children.iter().find(|c| c.segment == segment)
    }

    fn child_mut_or_insert(children: &mut Vec<ResourceNode>, segment: &str) -> usize {
        match children.iter().position(|c| c.segment == segment) {
            Some(pos) => pos,
            None => {
                children.push(ResourceNode::new(segment));
                children.len() - 1
            }
        }
    }
}

/// The children of the top-level `resources` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTree {
    pub roots: Vec<ResourceNode>,
}

impl ResourceTree {
    /// Builds the hierarchy in two passes: segment skeleton first, then method
    /// references looked up by each node's reconstructed path.
    pub fn build(registry: &PathRegistry) -> Self {
        let mut tree = ResourceTree::default();

        for (path, _) in registry.iter() {
            let segments = split_segments(path);
            if segments.is_empty() {
                warn!("Path '{}' has no segments; its methods get no resource", path);
                continue;
            }
            let mut level = &mut tree.roots;
            for segment in segments {
                let pos = ResourceNode::child_mut_or_insert(level, segment);
                level = &mut level[pos].children;
            }
        }

        for root in &mut tree.roots {
            attach_methods(root, "", registry);
        }

        debug!(
            "Built resource tree with {} top-level resources from {} paths",
            tree.roots.len(),
            registry.len()
        );
        tree
    }

    /// Follows `segments` from the top level
    pub fn find(&self, segments: &[&str]) -> Option<&ResourceNode> {
        let (first, rest) = segments.split_first()?;
        let mut node = self.roots.iter().find(|n| n.segment == *first)?;
        for segment in rest {
            node = node.child(segment)?;
        }
        Some(node)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

fn attach_methods(node: &mut ResourceNode, prefix: &str, registry: &PathRegistry) {
    let full = format!("{}/{}", prefix, node.segment);

    // Sphinx paths normally end in '/', but a bare form must not lose its methods.
    for key in [format!("{}/", full), full.clone()] {
        if let Some(ids) = registry.get(&key) {
            node.methods.extend(ids.iter().cloned());
        }
    }

    for child in &mut node.children {
        attach_methods(child, &full, registry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(entries: &[(&str, &str)]) -> PathRegistry {
        let mut registry = PathRegistry::new();
        for (path, id) in entries {
            registry.register(path, id);
        }
        registry
    }

    #[test]
    fn test_registry_preserves_order_and_groups_ids() {
        let registry = registry(&[
            ("/v2/foos/", "listFoos"),
            ("/v2/bars/", "listBars"),
            ("/v2/foos/", "createFoo"),
        ]);

        let paths: Vec<&str> = registry.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["/v2/foos/", "/v2/bars/"]);
        assert_eq!(
            registry.get("/v2/foos/").unwrap(),
            &["listFoos".to_string(), "createFoo".to_string()]
        );
        assert!(registry.get("/v2/baz/").is_none());
    }

    #[test]
    fn test_nested_resources_with_placeholder() {
        let registry = registry(&[
            ("/v2/foos/", "listFoos"),
            ("/v2/foos/{foo_id}/", "showFoo"),
        ]);
        let tree = ResourceTree::build(&registry);

        assert_eq!(tree.roots.len(), 1);
        let v2 = &tree.roots[0];
        assert_eq!(v2.segment, "v2");
        assert!(v2.methods.is_empty());

        let foos = v2.child("foos").unwrap();
        assert_eq!(foos.methods, vec!["listFoos"]);

        let foo = foos.child("{foo_id}").unwrap();
        assert_eq!(foo.methods, vec!["showFoo"]);
        assert_eq!(foo.id(), "foo_id");
    }

    #[test]
    fn test_shared_prefix_registered_out_of_order() {
        let registry = registry(&[
            ("/v2/foos/{foo_id}/bar/", "showFooBar"),
            ("/v2/alarms/", "listAlarms"),
            ("/v2/foos/", "listFoos"),
        ]);
        let tree = ResourceTree::build(&registry);

        let v2 = &tree.roots[0];
        let names: Vec<&str> = v2.children.iter().map(|c| c.segment.as_str()).collect();
        assert_eq!(names, vec!["foos", "alarms"]);

        assert_eq!(tree.find(&["v2", "foos"]).unwrap().methods, vec!["listFoos"]);
        let foo = tree.find(&["v2", "foos", "{foo_id}"]).unwrap();
        assert!(foo.methods.is_empty());
        assert_eq!(foo.child("bar").unwrap().methods, vec!["showFooBar"]);
    }

    #[test]
    fn test_path_without_trailing_slash_keeps_methods() {
        let registry = registry(&[("/v2/foos", "listFoos")]);
        let tree = ResourceTree::build(&registry);

        assert_eq!(tree.find(&["v2", "foos"]).unwrap().methods, vec!["listFoos"]);
        assert!(tree.find(&["v2"]).unwrap().methods.is_empty());
    }

    #[test]
    fn test_root_path_creates_no_resource() {
        let registry = registry(&[("/", "listRoot")]);
        let tree = ResourceTree::build(&registry);

        assert!(tree.is_empty());
    }
}
