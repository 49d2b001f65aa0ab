//! The gallery state machine: a directory cursor and an open-image cursor
//! moved by user commands, plus the bucket state that background probes
//! update through events.

use crate::classifier::{
    classify, spawn_probes, Classification, ContextId, EventKind, GalleryEvent,
    DEFAULT_PROBE_CONCURRENCY,
};
use crate::error::GalleryError;
use crate::models::{ImageDescriptor, NavigationCursor};
use crate::resolver::Resolver;
use crate::tree::{find_adjacent_directory, ScanOrder, TreeProvider};
use serde::{Deserialize, Serialize};
use storage::{BookmarkNode, ROOT_ID};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::form_urlencoded;

/// Everything a renderer needs for the current listing. A snapshot; later
/// promotions do not show up in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryView {
    pub directory_id: String,
    /// Set while the listing holds search results instead of children.
    pub search: Option<String>,
    pub ancestor_path: Vec<BookmarkNode>,
    pub directories: Vec<BookmarkNode>,
    pub links: Vec<BookmarkNode>,
    pub images: Vec<BookmarkNode>,
}

pub struct Gallery {
    tree: TreeProvider,
    resolver: Resolver,
    probe_concurrency: usize,
    cursor: NavigationCursor,
    classification: Classification,
    search: Option<String>,
    context: ContextId,
    events_tx: UnboundedSender<GalleryEvent>,
    events_rx: UnboundedReceiver<GalleryEvent>,
    probes: Option<JoinHandle<()>>,
}

impl Gallery {
    pub fn new(tree: TreeProvider, resolver: Resolver) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            tree,
            resolver,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            cursor: NavigationCursor {
                current_directory_id: ROOT_ID.to_string(),
                ..Default::default()
            },
            classification: Classification::default(),
            search: None,
            context: 0,
            events_tx,
            events_rx,
            probes: None,
        }
    }

    pub fn with_probe_concurrency(mut self, concurrency: usize) -> Self {
        self.probe_concurrency = concurrency;
        self
    }

    pub fn tree(&self) -> &TreeProvider {
        &self.tree
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn active_image(&self) -> Option<&ImageDescriptor> {
        self.cursor.active_image.as_ref()
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn view(&self) -> DirectoryView {
        DirectoryView {
            directory_id: self.cursor.current_directory_id.clone(),
            search: self.search.clone(),
            ancestor_path: self.cursor.ancestor_path.clone(),
            directories: self.classification.directories.clone(),
            links: self.classification.links.clone(),
            images: self.classification.images.clone(),
        }
    }

    /// Enters the directory named by a location query such as `?12` or
    /// `?id=12`, falling back to the root when that directory is gone or
    /// names a bookmark that is not a directory.
    pub async fn start(&mut self, query: Option<&str>) -> Result<(), GalleryError> {
        let id = directory_from_query(query.unwrap_or_default());
        match self.enter(&id).await {
            Err(GalleryError::NotFound(missing) | GalleryError::NotADirectory(missing))
                if id != ROOT_ID =>
            {
                warn!(id = %missing, "start directory unusable, opening root");
                self.enter(ROOT_ID).await
            }
            other => other,
        }
    }

    /// Reads children and breadcrumbs first; the cursor only changes once
    /// both succeeded. Links and images cannot be entered.
    pub async fn enter(&mut self, id: &str) -> Result<(), GalleryError> {
        if id != ROOT_ID && !self.tree.node(id).await?.is_directory() {
            return Err(GalleryError::NotADirectory(id.to_string()));
        }
        let children = self.tree.children(id).await?;
        let ancestor_path = self.tree.ancestor_path(id).await?;
        let classification = classify(children);
        info!(
            id,
            directories = classification.directories.len(),
            links = classification.links.len(),
            images = classification.images.len(),
            "entered directory"
        );
        self.cursor.current_directory_id = id.to_string();
        self.cursor.ancestor_path = ancestor_path;
        self.search = None;
        self.replace_listing(classification);
        Ok(())
    }

    pub async fn up(&mut self) -> Result<(), GalleryError> {
        let current = self.tree.node(&self.cursor.current_directory_id).await?;
        let parent = current.parent_id.unwrap_or_else(|| ROOT_ID.to_string());
        self.enter(&parent).await
    }

    /// Nearest directory before the current one among its siblings. Returns
    /// false, leaving the cursor alone, when there is none.
    pub async fn left(&mut self) -> Result<bool, GalleryError> {
        self.sideways(ScanOrder::Forward).await
    }

    /// Nearest directory after the current one among its siblings.
    pub async fn right(&mut self) -> Result<bool, GalleryError> {
        self.sideways(ScanOrder::Backward).await
    }

    async fn sideways(&mut self, order: ScanOrder) -> Result<bool, GalleryError> {
        let current_id = self.cursor.current_directory_id.clone();
        let current = self.tree.node(&current_id).await?;
        let parent = current.parent_id.unwrap_or_else(|| ROOT_ID.to_string());
        let siblings = self.tree.children(&parent).await?;
        let Some(target) = find_adjacent_directory(&siblings, &current_id, order) else {
            debug!(id = %current_id, ?order, "no adjacent directory");
            return Ok(false);
        };
        let target = target.id.clone();
        self.enter(&target).await?;
        Ok(true)
    }

    /// Opens a member of the images bucket full size.
    pub async fn open_image(&mut self, id: &str) -> Result<&ImageDescriptor, GalleryError> {
        let position = self
            .classification
            .image_position(id)
            .ok_or_else(|| GalleryError::NotFound(id.to_string()))?;
        self.open_at(position).await
    }

    pub async fn next_image(&mut self) -> Result<Option<&ImageDescriptor>, GalleryError> {
        self.step(1).await
    }

    pub async fn previous_image(&mut self) -> Result<Option<&ImageDescriptor>, GalleryError> {
        self.step(-1).await
    }

    /// Moves the open image by `delta` with wraparound. An open image that
    /// has left the bucket counts as sitting just outside either end.
    async fn step(&mut self, delta: isize) -> Result<Option<&ImageDescriptor>, GalleryError> {
        let len = self.classification.images.len();
        let Some(active) = &self.cursor.active_image else {
            return Ok(None);
        };
        if len == 0 {
            return Ok(None);
        }
        let target = match self.classification.image_position(&active.source.id) {
            Some(pos) => (pos as isize + delta).rem_euclid(len as isize) as usize,
            None if delta > 0 => 0,
            None => len - 1,
        };
        self.open_at(target).await.map(Some)
    }

    /// A node that fails to resolve goes back to the links bucket; the open
    /// image stays as it was.
    async fn open_at(&mut self, position: usize) -> Result<&ImageDescriptor, GalleryError> {
        let node = self.classification.images[position].clone();
        match self.resolver.resolve(&node).await {
            Ok(descriptor) => Ok(self.cursor.active_image.insert(descriptor)),
            Err(e) => {
                if e.is_recoverable() && self.classification.demote(&node.id) {
                    warn!(id = %node.id, error = %e, "image failed to resolve, demoted to link");
                }
                Err(e)
            }
        }
    }

    pub fn close_image(&mut self) {
        self.cursor.active_image = None;
    }

    /// Lists search results in place of the current directory's children.
    /// An empty query re-enters the current directory.
    pub async fn search(&mut self, query: &str) -> Result<(), GalleryError> {
        let query = query.trim();
        if query.is_empty() {
            let current = self.cursor.current_directory_id.clone();
            return self.enter(&current).await;
        }
        let results = self.tree.search(query).await?;
        let classification = classify(results);
        info!(query, results = classification.len(), "search");
        self.search = Some(query.to_string());
        self.replace_listing(classification);
        Ok(())
    }

    /// A renderer saw `id` fail to load as an image. Queued like a probe
    /// result and applied by the next [`pump`](Self::pump).
    pub fn report_broken(&self, id: &str) {
        let event = GalleryEvent {
            context: self.context,
            kind: EventKind::Demote(id.to_string()),
        };
        // The receiver lives in self, so the channel cannot be closed here.
        let _ = self.events_tx.send(event);
    }

    /// Applies queued events that belong to the current listing and drops the
    /// rest. Returns the ones that changed a bucket.
    pub fn pump(&mut self) -> Vec<EventKind> {
        let mut applied = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if event.context != self.context {
                debug!(
                    event = event.context,
                    current = self.context,
                    "dropping stale event"
                );
                continue;
            }
            if self.classification.apply(&event.kind) {
                applied.push(event.kind);
            }
        }
        applied
    }

    /// Waits for the current probes to finish, then pumps.
    pub async fn settle(&mut self) -> Vec<EventKind> {
        if let Some(probes) = self.probes.take() {
            if let Err(e) = probes.await {
                debug!(error = %e, "probe task ended early");
            }
        }
        self.pump()
    }

    fn replace_listing(&mut self, classification: Classification) {
        if let Some(previous) = self.probes.take() {
            previous.abort();
        }
        self.context += 1;
        let links = classification.links.clone();
        self.classification = classification;
        if !links.is_empty() {
            self.probes = Some(spawn_probes(
                links,
                self.resolver.http(),
                self.probe_concurrency,
                self.context,
                self.events_tx.clone(),
            ));
        }
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        if let Some(probes) = self.probes.take() {
            probes.abort();
        }
    }
}

/// Directory id from a location query: `?12`, `?id=12`, or percent-encoded
/// forms of either. Missing or malformed ids mean the root.
pub fn directory_from_query(raw: &str) -> String {
    let query = raw.trim().trim_start_matches('?');
    let mut candidate = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key == "id" {
            candidate = Some(value.into_owned());
            break;
        }
        if candidate.is_none() && value.is_empty() {
            candidate = Some(key.into_owned());
        }
    }
    match candidate {
        Some(id) if is_valid_id(&id) => id,
        _ => ROOT_ID.to_string(),
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
