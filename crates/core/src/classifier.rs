//! Partitions sibling nodes into directories, links and images, and upgrades
//! links to images once a content-type probe confirms them.

use crate::recognizers::is_any_image;
use futures::stream::{self, StreamExt};
use providers::{probe, HttpClient};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::BookmarkNode;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_PROBE_CONCURRENCY: usize = 8;

/// Three ordered buckets. Every classified node sits in exactly one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub directories: Vec<BookmarkNode>,
    pub links: Vec<BookmarkNode>,
    pub images: Vec<BookmarkNode>,
}

/// Identifies the directory or search a classification was made for.
pub type ContextId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Promote(BookmarkNode),
    Demote(String),
}

/// A bucket change produced off the navigation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEvent {
    pub context: ContextId,
    pub kind: EventKind,
}

pub fn classify(nodes: Vec<BookmarkNode>) -> Classification {
    let mut out = Classification::default();
    for node in nodes {
        match node.url.as_deref() {
            None => out.directories.push(node),
            Some(url) if is_any_image(url) => out.images.push(node),
            Some(_) => out.links.push(node),
        }
    }
    out
}

impl Classification {
    pub fn len(&self) -> usize {
        self.directories.len() + self.links.len() + self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Moves a link to the end of `images`. False if `id` is not a link.
    pub fn promote(&mut self, id: &str) -> bool {
        match self.links.iter().position(|n| n.id == id) {
            Some(pos) => {
                let node = self.links.remove(pos);
                self.images.push(node);
                true
            }
            None => false,
        }
    }

    /// Moves an image back to the end of `links`. False if `id` is not an image.
    pub fn demote(&mut self, id: &str) -> bool {
        match self.image_position(id) {
            Some(pos) => {
                let node = self.images.remove(pos);
                self.links.push(node);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, kind: &EventKind) -> bool {
        match kind {
            EventKind::Promote(node) => self.promote(&node.id),
            EventKind::Demote(id) => self.demote(id),
        }
    }

    pub fn image_position(&self, id: &str) -> Option<usize> {
        self.images.iter().position(|n| n.id == id)
    }
}

async fn probe_link(http: &dyn HttpClient, node: BookmarkNode) -> (BookmarkNode, bool) {
    let Some(url) = node.url.as_deref() else {
        return (node, false);
    };
    match probe::is_image(http, url).await {
        Ok(is_image) => {
            debug!(id = %node.id, %url, is_image, "probed link");
            (node, is_image)
        }
        Err(e) => {
            warn!(id = %node.id, %url, error = %e, "link probe failed");
            (node, false)
        }
    }
}

/// Probes every link and promotes the ones serving `image/*`, calling
/// `on_promote` for each. Nodes already in `images` are never probed again.
/// Returns the number of promotions.
pub async fn reclassify<F>(
    classification: &mut Classification,
    http: &dyn HttpClient,
    concurrency: usize,
    mut on_promote: F,
) -> usize
where
    F: FnMut(&BookmarkNode),
{
    let links = classification.links.clone();
    let mut results = stream::iter(links)
        .map(|node| probe_link(http, node))
        .buffer_unordered(concurrency.max(1));
    let mut promoted = 0;
    while let Some((node, is_image)) = results.next().await {
        if is_image && classification.promote(&node.id) {
            on_promote(&node);
            promoted += 1;
        }
    }
    promoted
}

/// Same probes as [`reclassify`] on a background task. Promotions arrive on
/// `events` tagged with `context`; the receiver decides whether they still
/// apply.
pub fn spawn_probes(
    links: Vec<BookmarkNode>,
    http: Arc<dyn HttpClient>,
    concurrency: usize,
    context: ContextId,
    events: UnboundedSender<GalleryEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut results = stream::iter(links)
            .map(|node| {
                let http = http.clone();
                async move { probe_link(http.as_ref(), node).await }
            })
            .buffer_unordered(concurrency.max(1));
        while let Some((node, is_image)) = results.next().await {
            if !is_image {
                continue;
            }
            let event = GalleryEvent {
                context,
                kind: EventKind::Promote(node),
            };
            if events.send(event).is_err() {
                debug!(context, "gallery dropped, stopping probes");
                break;
            }
        }
    })
}
