//! Gallery error taxonomy

use providers::{ProviderError, Scheme};
use storage::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GalleryError {
    // ===== Tree store =====
    #[error("bookmark not found: {0}")]
    NotFound(String),

    /// A parent chain revisits `id` instead of reaching the root.
    #[error("corrupt bookmark tree: {id} repeats in its own ancestor chain")]
    CorruptTree { id: String },

    #[error("bookmark store failed: {0}")]
    Store(String),

    #[error("bookmark {0} is not a directory")]
    NotADirectory(String),

    // ===== Resolution (recoverable: demote to a link) =====
    #[error("not an image: {url} (content type {content_type:?})")]
    NotAnImage {
        url: String,
        content_type: Option<String>,
    },

    #[error("reddit post {url} links to another reddit post")]
    UnresolvableRecursion { url: String },

    #[error("no {scheme} credential configured to resolve {url}")]
    MissingCredential { scheme: Scheme, url: String },

    #[error("{scheme} could not resolve {url}: {context}")]
    UpstreamError {
        scheme: Scheme,
        url: String,
        context: String,
    },

    #[error("bookmark {0} is a directory")]
    NoUrl(String),
}

impl GalleryError {
    pub(crate) fn upstream(scheme: Scheme, url: &str, err: ProviderError) -> Self {
        GalleryError::UpstreamError {
            scheme,
            url: url.to_string(),
            context: err.to_string(),
        }
    }

    /// Resolver failures are recoverable; the node falls back to a link.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GalleryError::NotFound(_)
                | GalleryError::NotADirectory(_)
                | GalleryError::NotAnImage { .. }
                | GalleryError::UnresolvableRecursion { .. }
                | GalleryError::MissingCredential { .. }
                | GalleryError::UpstreamError { .. }
                | GalleryError::NoUrl(_)
        )
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }
}

impl From<StoreError> for GalleryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => GalleryError::NotFound(id),
            other => GalleryError::Store(other.to_string()),
        }
    }
}
