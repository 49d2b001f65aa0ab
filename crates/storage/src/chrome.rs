//! Chromium `Bookmarks` file reader.
//!
//! The browser exposes `roots.bookmark_bar`, `roots.other` and `roots.synced`
//! as children of an unnamed root with id `0`; this adapter does the same.

use crate::{BookmarkNode, MemoryStore, StoreError, TreeStore, ROOT_ID};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Microseconds between 1601-01-01 and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

#[derive(Debug, Deserialize)]
struct BookmarksFile {
    roots: Roots,
}

#[derive(Debug, Deserialize)]
struct Roots {
    bookmark_bar: Option<RawNode>,
    other: Option<RawNode>,
    synced: Option<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
    date_added: Option<String>,
    #[serde(default)]
    children: Vec<RawNode>,
}

pub struct ChromeBookmarks {
    inner: MemoryStore,
}

impl ChromeBookmarks {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let store = Self::from_json(&content)?;
        debug!(path = %path.display(), nodes = store.inner.len(), "loaded chrome bookmarks");
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let file: BookmarksFile = serde_json::from_str(content)?;
        let inner = MemoryStore::new();
        let roots = [file.roots.bookmark_bar, file.roots.other, file.roots.synced];
        for root in roots.into_iter().flatten() {
            flatten(root, ROOT_ID, &inner);
        }
        Ok(Self { inner })
    }
}

fn flatten(raw: RawNode, parent_id: &str, into: &MemoryStore) {
    let url = match raw.kind.as_str() {
        "folder" => None,
        "url" => match raw.url {
            Some(url) => Some(url),
            None => return,
        },
        _ => return,
    };
    let id = raw.id;
    into.insert(BookmarkNode {
        id: id.clone(),
        parent_id: Some(parent_id.to_string()),
        url,
        title: raw.name,
        date_added: raw.date_added.as_deref().and_then(webkit_to_unix_millis),
    });
    for child in raw.children {
        flatten(child, &id, into);
    }
}

fn webkit_to_unix_millis(raw: &str) -> Option<i64> {
    let micros: i64 = raw.parse().ok()?;
    if micros == 0 {
        return None;
    }
    Some(micros.checked_sub(WEBKIT_EPOCH_OFFSET_MICROS)? / 1000)
}

#[async_trait::async_trait]
impl TreeStore for ChromeBookmarks {
    async fn get(&self, id: &str) -> Result<BookmarkNode, StoreError> {
        self.inner.get(id).await
    }

    async fn children(&self, id: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        self.inner.children(id).await
    }

    async fn search(&self, query: &str) -> Result<Vec<BookmarkNode>, StoreError> {
        self.inner.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "checksum": "abc",
        "version": 1,
        "roots": {
            "bookmark_bar": {
                "id": "1", "name": "Bookmarks bar", "type": "folder",
                "date_added": "13245000000000000",
                "children": [
                    { "id": "4", "name": "Wallpapers", "type": "folder", "children": [
                        { "id": "5", "name": "Sky", "type": "url", "url": "https://example.com/sky.jpg" }
                    ]},
                    { "id": "6", "name": "News", "type": "url", "url": "https://example.com/" }
                ]
            },
            "other": { "id": "2", "name": "Other bookmarks", "type": "folder", "children": [] },
            "synced": { "id": "3", "name": "Mobile bookmarks", "type": "folder", "children": [] }
        }
    }"#;

    #[tokio::test]
    async fn roots_hang_under_zero() {
        let store = ChromeBookmarks::from_json(SAMPLE).unwrap();
        let top: Vec<String> = store
            .children(ROOT_ID)
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(top, vec!["Bookmarks bar", "Other bookmarks", "Mobile bookmarks"]);

        let sky = store.get("5").await.unwrap();
        assert_eq!(sky.parent_id.as_deref(), Some("4"));
        assert_eq!(sky.url.as_deref(), Some("https://example.com/sky.jpg"));
    }

    #[tokio::test]
    async fn converts_webkit_timestamps() {
        let store = ChromeBookmarks::from_json(SAMPLE).unwrap();
        let bar = store.get("1").await.unwrap();
        assert_eq!(bar.date_added, Some(1_600_526_400_000));
        assert_eq!(store.get("6").await.unwrap().date_added, None);
    }

    #[test]
    fn out_of_range_timestamps_are_dropped() {
        assert_eq!(webkit_to_unix_millis("-9223372036854775808"), None);
        assert_eq!(webkit_to_unix_millis("not a number"), None);
        assert_eq!(webkit_to_unix_millis("13245000000000000"), Some(1_600_526_400_000));
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(matches!(
            ChromeBookmarks::from_json("{\"roots\": 3}"),
            Err(StoreError::Parse(_))
        ));
    }
}
