use crate::{matches_query, query_terms, BookmarkNode, StoreError, TreeStore, ROOT_ID};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Tree {
    nodes: HashMap<String, BookmarkNode>,
    children: HashMap<String, Vec<String>>,
}

/// In-memory bookmark tree. Used as the backing for file-based stores and
/// as a fixture in tests.
#[derive(Debug)]
pub struct MemoryStore {
    tree: RwLock<Tree>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut tree = Tree::default();
        tree.nodes.insert(
            ROOT_ID.to_string(),
            BookmarkNode {
                id: ROOT_ID.to_string(),
                parent_id: None,
                url: None,
                title: String::new(),
                date_added: None,
            },
        );
        Self {
            tree: RwLock::new(tree),
        }
    }

    pub fn with_nodes(nodes: impl IntoIterator<Item = BookmarkNode>) -> Self {
        let store = Self::new();
        for node in nodes {
            store.insert(node);
        }
        store
    }

    /// Adds a node at the end of its parent's children. Re-inserting an id
    /// replaces the node in place.
    pub fn insert(&self, node: BookmarkNode) {
        let mut tree = self.tree.write();
        let id = node.id.clone();
        let parent = node.parent_id.clone();
        let existed = tree.nodes.insert(id.clone(), node).is_some();
        if !existed {
            if let Some(parent) = parent {
                tree.children.entry(parent).or_default().push(id);
            }
        }
    }

    /// Removes a node; its descendants become unreachable.
    pub fn remove(&self, id: &str) -> Option<BookmarkNode> {
        let mut tree = self.tree.write();
        let node = tree.nodes.remove(id)?;
        if let Some(parent) = &node.parent_id {
            if let Some(siblings) = tree.children.get_mut(parent) {
                siblings.retain(|s| s != id);
            }
        }
        Some(node)
    }

    pub fn len(&self) -> usize {
        self.tree.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl TreeStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        self.tree
            .read()
            .nodes
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn children(&self, id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let tree = self.tree.read();
        if !tree.nodes.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(tree
            .children
            .get(id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|child| tree.nodes.get(child).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search(&self, query: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        let terms = query_terms(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let tree = self.tree.read();
        // Walk in tree order so results are stable between calls.
        let mut found = Vec::new();
        let mut stack = vec![ROOT_ID.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(node) = tree.nodes.get(&id) {
                if id != ROOT_ID && matches_query(node, &terms) {
                    found.push(node.clone());
                }
            }
            if let Some(children) = tree.children.get(&id) {
                stack.extend(children.iter().rev().cloned());
            }
        }
        Ok(found)
    }
}
