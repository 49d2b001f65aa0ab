//! Storage layer: read-only access to an external bookmark tree.
//!
//! Holds the node model, the `TreeStore` seam and the adapters for the
//! bookmark stores we know how to read.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chrome;
pub mod memory;
pub mod places;

pub use chrome::ChromeBookmarks;
pub use memory::MemoryStore;
pub use places::PlacesStore;

/// Identity of the tree root. Every store exposes its root under this id.
pub const ROOT_ID: &str = "0";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no bookmark with id {0}")]
    NotFound(String),
    #[error("bookmark backend failed: {0}")]
    Backend(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("bookmark file is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One node of the bookmark tree. A node without a url is a directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkNode {
    pub id: String,
    pub parent_id: Option<String>,
    pub url: Option<String>,
    pub title: String,
    /// Milliseconds since the Unix epoch.
    pub date_added: Option<i64>,
}

impl BookmarkNode {
    pub fn directory(id: &str, parent_id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: Some(parent_id.to_string()),
            url: None,
            title: title.to_string(),
            date_added: None,
        }
    }

    pub fn link(id: &str, parent_id: &str, title: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            parent_id: Some(parent_id.to_string()),
            url: Some(url.to_string()),
            title: title.to_string(),
            date_added: None,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.url.is_none()
    }
}

#[async_trait::async_trait]
pub trait TreeStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<BookmarkNode, StoreError>;

    /// Direct children in store order. Empty for leaves and empty directories.
    async fn children(&self, id: &str) -> Result<Vec<BookmarkNode>, StoreError>;

    async fn search(&self, query: &str) -> Result<Vec<BookmarkNode>, StoreError>;
}

/// Case-insensitive match of every whitespace separated term against the
/// title or url of a node.
pub(crate) fn matches_query(node: &BookmarkNode, terms: &[String]) -> bool {
    let title = node.title.to_lowercase();
    let url = node.url.as_deref().unwrap_or("").to_lowercase();
    terms
        .iter()
        .all(|t| title.contains(t.as_str()) || url.contains(t.as_str()))
}

pub(crate) fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(|t| t.to_lowercase()).collect()
}
