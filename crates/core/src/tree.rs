//! Read-only facade over the bookmark store. Every call goes to the store;
//! nothing is cached.

use crate::error::GalleryError;
use std::collections::HashSet;
use std::sync::Arc;
use storage::{BookmarkNode, TreeStore, ROOT_ID};
use tracing::debug;

pub const DEFAULT_SEARCH_LIMIT: usize = 200;

/// Order in which `find_adjacent_directory` walks the sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    Forward,
    Backward,
}

#[derive(Clone)]
pub struct TreeProvider {
    store: Arc<dyn TreeStore>,
    search_limit: usize,
}

impl TreeProvider {
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self {
            store,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    pub async fn node(&self, id: &str) -> Result<BookmarkNode, GalleryError> {
        Ok(self.store.get(id).await?)
    }

    pub async fn children(&self, directory_id: &str) -> Result<Vec<BookmarkNode>, GalleryError> {
        Ok(self.store.children(directory_id).await?)
    }

    /// Directories from just below the root down to the parent of `id`.
    /// Empty for the root and its direct children.
    pub async fn ancestor_path(&self, id: &str) -> Result<Vec<BookmarkNode>, GalleryError> {
        if id == ROOT_ID {
            return Ok(Vec::new());
        }
        let node = self.store.get(id).await?;
        let mut seen = HashSet::from([id.to_string()]);
        let mut path = Vec::new();
        let mut cursor = node.parent_id.unwrap_or_else(|| ROOT_ID.to_string());
        while cursor != ROOT_ID {
            if !seen.insert(cursor.clone()) {
                return Err(GalleryError::CorruptTree { id: cursor });
            }
            let ancestor = self.store.get(&cursor).await?;
            cursor = ancestor
                .parent_id
                .clone()
                .unwrap_or_else(|| ROOT_ID.to_string());
            path.push(ancestor);
        }
        path.reverse();
        Ok(path)
    }

    /// Store search capped at the configured limit.
    pub async fn search(&self, query: &str) -> Result<Vec<BookmarkNode>, GalleryError> {
        let mut found = self.store.search(query).await?;
        if found.len() > self.search_limit {
            debug!(query, total = found.len(), limit = self.search_limit, "capping search results");
            found.truncate(self.search_limit);
        }
        Ok(found)
    }
}

/// Nearest directory that comes before `target_id` when `siblings` is walked
/// in `order`. Links and images are skipped. `None` if `target_id` is absent
/// or nothing precedes it.
pub fn find_adjacent_directory<'a>(
    siblings: &'a [BookmarkNode],
    target_id: &str,
    order: ScanOrder,
) -> Option<&'a BookmarkNode> {
    match order {
        ScanOrder::Forward => nearest_before(siblings.iter(), target_id),
        ScanOrder::Backward => nearest_before(siblings.iter().rev(), target_id),
    }
}

fn nearest_before<'a>(
    nodes: impl Iterator<Item = &'a BookmarkNode>,
    target_id: &str,
) -> Option<&'a BookmarkNode> {
    let mut previous = None;
    for node in nodes {
        if node.id == target_id {
            return previous;
        }
        if node.is_directory() {
            previous = Some(node);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::MemoryStore;

    fn siblings() -> Vec<BookmarkNode> {
        vec![
            BookmarkNode::directory("d1", ROOT_ID, "first"),
            BookmarkNode::link("l1", ROOT_ID, "link", "https://example.com"),
            BookmarkNode::directory("d2", ROOT_ID, "second"),
            BookmarkNode::link("i1", ROOT_ID, "image", "https://example.com/a.png"),
            BookmarkNode::directory("target", ROOT_ID, "target"),
        ]
    }

    #[test]
    fn previous_directory_skips_non_directories() {
        let list = siblings();
        let found = find_adjacent_directory(&list, "target", ScanOrder::Forward);
        assert_eq!(found.map(|n| n.id.as_str()), Some("d2"));

        let mut reversed = list.clone();
        reversed.reverse();
        let found = find_adjacent_directory(&reversed, "target", ScanOrder::Backward);
        assert_eq!(found.map(|n| n.id.as_str()), Some("d2"));
    }

    #[test]
    fn next_directory_scans_backward() {
        let list = siblings();
        let found = find_adjacent_directory(&list, "d1", ScanOrder::Backward);
        assert_eq!(found.map(|n| n.id.as_str()), Some("d2"));
        assert_eq!(find_adjacent_directory(&list, "target", ScanOrder::Backward), None);
    }

    #[test]
    fn missing_target_or_no_predecessor() {
        let list = siblings();
        assert_eq!(find_adjacent_directory(&list, "d1", ScanOrder::Forward), None);
        assert_eq!(find_adjacent_directory(&list, "nope", ScanOrder::Forward), None);
        assert_eq!(find_adjacent_directory(&[], "d1", ScanOrder::Forward), None);
    }

    fn deep_store() -> MemoryStore {
        MemoryStore::with_nodes([
            BookmarkNode::directory("a", ROOT_ID, "a"),
            BookmarkNode::directory("b", "a", "b"),
            BookmarkNode::directory("c", "b", "c"),
        ])
    }

    #[tokio::test]
    async fn ancestor_path_runs_root_first() {
        let tree = TreeProvider::new(Arc::new(deep_store()));
        let path = tree.ancestor_path("c").await.unwrap();
        let ids: Vec<&str> = path.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(tree.ancestor_path(ROOT_ID).await.unwrap().is_empty());
        assert!(tree.ancestor_path("a").await.unwrap().is_empty());
        assert!(matches!(
            tree.ancestor_path("zzz").await,
            Err(GalleryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cyclic_parent_chain_is_corrupt() {
        let store = MemoryStore::with_nodes([
            BookmarkNode::directory("x", "y", "x"),
            BookmarkNode::directory("y", "x", "y"),
            BookmarkNode::directory("z", "x", "z"),
        ]);
        let tree = TreeProvider::new(Arc::new(store));
        assert!(matches!(
            tree.ancestor_path("z").await,
            Err(GalleryError::CorruptTree { .. })
        ));
        let self_loop = MemoryStore::with_nodes([BookmarkNode::directory("s", "s", "s")]);
        let tree = TreeProvider::new(Arc::new(self_loop));
        assert!(matches!(
            tree.ancestor_path("s").await,
            Err(GalleryError::CorruptTree { id }) if id == "s"
        ));
    }

    #[tokio::test]
    async fn search_is_capped() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(BookmarkNode::link(
                &format!("n{}", i),
                ROOT_ID,
                "kitten",
                "https://example.com",
            ));
        }
        let tree = TreeProvider::new(Arc::new(store)).with_search_limit(3);
        assert_eq!(tree.search("kitten").await.unwrap().len(), 3);
    }
}
