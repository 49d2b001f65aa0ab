use providers::Scheme;
use serde::{Deserialize, Serialize};
use storage::BookmarkNode;

/// A bookmark resolved to something displayable. Recomputed on every access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub source: BookmarkNode,
    pub scheme: Scheme,
    pub canonical_url: String,
    pub title: String,
    pub preview_url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageDescriptor {
    /// What to show until the canonical asset has loaded.
    pub fn initial_url(&self) -> &str {
        self.preview_url.as_deref().unwrap_or(&self.canonical_url)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationCursor {
    pub current_directory_id: String,
    /// Root (exclusive) down to the current directory (exclusive).
    pub ancestor_path: Vec<BookmarkNode>,
    pub active_image: Option<ImageDescriptor>,
}
