use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// A named unit of text in a hierarchical knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNode {
    pub name: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<KnowledgeNode>,
}

impl KnowledgeNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
            children: Vec::new(),
        }
    }

    pub fn with_content(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Some(content.into()),
            children: Vec::new(),
        }
    }

    /// Content, unless it is missing or empty.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    pub fn child(&self, name: &str) -> Option<&KnowledgeNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut KnowledgeNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }
}

/// Anything that can hand out a flat list of nodes. `None` entries are allowed
/// and stand for nodes that could not be resolved.
pub trait KnowledgeBase {
    fn collect_all_nodes(&self) -> Vec<Option<&KnowledgeNode>>;
}

impl KnowledgeBase for [Option<KnowledgeNode>] {
    fn collect_all_nodes(&self) -> Vec<Option<&KnowledgeNode>> {
        self.iter().map(Option::as_ref).collect()
    }
}

impl KnowledgeBase for Vec<Option<KnowledgeNode>> {
    fn collect_all_nodes(&self) -> Vec<Option<&KnowledgeNode>> {
        self.as_slice().collect_all_nodes()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeTree {
    pub root: KnowledgeNode,
}

impl Default for KnowledgeTree {
    fn default() -> Self {
        Self::new("root")
    }
}

impl KnowledgeTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: KnowledgeNode::new(root_name),
        }
    }

    /// Accepts either `{"root": {...}}` or a bare root node.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if value.get("root").is_some() {
            Ok(serde_json::from_value(value)?)
        } else {
            Ok(Self {
                root: serde_json::from_value(value)?,
            })
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Appends `node` under the node reached by following `parent_path` from the root.
    /// An empty path means the root itself.
    pub fn insert(&mut self, parent_path: &[&str], node: KnowledgeNode) -> Result<()> {
        let mut current = &mut self.root;
        for segment in parent_path {
            current = current.child_mut(segment).ok_or_else(|| {
                ResearchError::KnowledgeBase(format!(
                    "no node `{}` under path {:?}",
                    segment, parent_path
                ))
            })?;
        }
        current.children.push(node);
        Ok(())
    }

    pub fn find(&self, path: &[&str]) -> Option<&KnowledgeNode> {
        path.iter()
            .try_fold(&self.root, |node, segment| node.child(segment))
    }
}

impl KnowledgeBase for KnowledgeTree {
    /// Depth-first pre-order, root first.
    fn collect_all_nodes(&self) -> Vec<Option<&KnowledgeNode>> {
        let mut nodes = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            nodes.push(Some(node));
            stack.extend(node.children.iter().rev());
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> KnowledgeTree {
        let mut tree = KnowledgeTree::default();
        tree.insert(&[], KnowledgeNode::new("Backend")).unwrap();
        tree.insert(&["Backend"], KnowledgeNode::with_content("API", "REST gateway"))
            .unwrap();
        tree.insert(&["Backend"], KnowledgeNode::with_content("Storage", "Postgres"))
            .unwrap();
        tree.insert(&[], KnowledgeNode::with_content("Frontend", "SPA")).unwrap();
        tree
    }

    fn names(tree: &KnowledgeTree) -> Vec<String> {
        tree.collect_all_nodes()
            .into_iter()
            .flatten()
            .map(|n| n.name.clone())
            .collect()
    }

    #[test]
    fn traversal_is_preorder() {
        assert_eq!(
            names(&sample_tree()),
            vec!["root", "Backend", "API", "Storage", "Frontend"]
        );
    }

    #[test]
    fn insert_under_missing_parent_fails() {
        let mut tree = KnowledgeTree::default();
        let err = tree
            .insert(&["Nowhere"], KnowledgeNode::new("Orphan"))
            .unwrap_err();
        assert!(matches!(err, ResearchError::KnowledgeBase(_)));
    }

    #[test]
    fn find_follows_path() {
        let tree = sample_tree();
        assert_eq!(
            tree.find(&["Backend", "Storage"]).and_then(|n| n.content.as_deref()),
            Some("Postgres")
        );
        assert!(tree.find(&["Backend", "Cache"]).is_none());
        assert_eq!(tree.find(&[]).map(|n| n.name.as_str()), Some("root"));
    }

    #[test]
    fn loads_bare_root_and_wrapped_root() {
        let bare = r#"{"name":"kb","children":[{"name":"A","content":"x"}]}"#;
        let wrapped = r#"{"root":{"name":"kb","children":[{"name":"A","content":"x"}]}}"#;
        let a = KnowledgeTree::from_json_str(bare).unwrap();
        let b = KnowledgeTree::from_json_str(wrapped).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.find(&["A"]).unwrap().text(), Some("x"));
    }

    #[test]
    fn empty_and_missing_content_count_as_no_content() {
        assert_eq!(KnowledgeNode::new("a").text(), None);
        assert_eq!(KnowledgeNode::with_content("b", "").text(), None);
        assert_eq!(KnowledgeNode::with_content("c", " ").text(), Some(" "));
    }

    #[test]
    fn flat_list_keeps_null_entries() {
        let nodes = vec![None, Some(KnowledgeNode::with_content("A", "x"))];
        let collected = nodes.collect_all_nodes();
        assert_eq!(collected.len(), 2);
        assert!(collected[0].is_none());
    }
}
