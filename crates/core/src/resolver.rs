//! Turns an image bookmark into an [`ImageDescriptor`] by dispatching on the
//! hosting scheme its url belongs to.

use crate::error::GalleryError;
use crate::models::ImageDescriptor;
use crate::recognizers::{is_reddit_post, recognize};
use futures::future::{BoxFuture, FutureExt};
use providers::{
    deviantart, flickr, imgur, pixiv, probe, reddit, tumblr, twitter, CredentialSource, HostImage,
    HttpClient, ProviderError, Scheme,
};
use std::sync::Arc;
use storage::BookmarkNode;
use tracing::debug;

pub const DEFAULT_MAX_REDIRECT_DEPTH: usize = 1;

const INSTAGRAM_ID_LEN: usize = 11;

#[derive(Clone)]
pub struct Resolver {
    http: Arc<dyn HttpClient>,
    credentials: Arc<dyn CredentialSource>,
    max_depth: usize,
}

impl Resolver {
    pub fn new(http: Arc<dyn HttpClient>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            http,
            credentials,
            max_depth: DEFAULT_MAX_REDIRECT_DEPTH,
        }
    }

    /// How many posts that merely link elsewhere (reddit) may be followed.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn http(&self) -> Arc<dyn HttpClient> {
        self.http.clone()
    }

    pub async fn resolve(&self, node: &BookmarkNode) -> Result<ImageDescriptor, GalleryError> {
        let url = node
            .url
            .clone()
            .ok_or_else(|| GalleryError::NoUrl(node.id.clone()))?;
        self.resolve_url(node, url, None, 0).await
    }

    fn resolve_url<'a>(
        &'a self,
        node: &'a BookmarkNode,
        url: String,
        display_url: Option<String>,
        depth: usize,
    ) -> BoxFuture<'a, Result<ImageDescriptor, GalleryError>> {
        async move {
            let scheme = recognize(&url);
            debug!(id = %node.id, %url, %scheme, depth, "resolving");
            let http = self.http.as_ref();
            let fetched = match scheme {
                Scheme::Direct => return Ok(direct_image(node, &url)),
                Scheme::Instagram => return instagram(node, &url),
                Scheme::Reddit => return self.follow_reddit(node, &url, depth).await,
                Scheme::Generic => return self.probe_generic(node, &url, display_url).await,
                Scheme::DeviantArt => deviantart::fetch(http, &url).await,
                Scheme::Pixiv => {
                    let token = self.credential(scheme, &url)?;
                    pixiv::fetch(http, &url, &token).await
                }
                Scheme::Flickr => {
                    let key = self.credential(scheme, &url)?;
                    flickr::fetch(http, &url, &node.title, &key).await
                }
                Scheme::Tumblr => {
                    let key = self.credential(scheme, &url)?;
                    tumblr::fetch(http, &url, &node.title, &key).await
                }
                Scheme::Imgur => {
                    let client_id = self.credential(scheme, &url)?;
                    imgur::fetch(http, &url, &node.title, &client_id).await
                }
                Scheme::Twitter => {
                    let token = self.credential(scheme, &url)?;
                    twitter::fetch(http, &url, &node.title, &token).await
                }
            };
            let image = fetched.map_err(|e| GalleryError::upstream(scheme, &url, e))?;
            Ok(from_host(node, scheme, image))
        }
        .boxed()
    }

    fn credential(&self, scheme: Scheme, url: &str) -> Result<String, GalleryError> {
        self.credentials
            .credential(scheme)
            .ok_or_else(|| GalleryError::MissingCredential {
                scheme,
                url: url.to_string(),
            })
    }

    async fn follow_reddit(
        &self,
        node: &BookmarkNode,
        url: &str,
        depth: usize,
    ) -> Result<ImageDescriptor, GalleryError> {
        let linked = reddit::fetch_link(self.http.as_ref(), url)
            .await
            .map_err(|e| GalleryError::upstream(Scheme::Reddit, url, e))?;
        if is_reddit_post(&linked.url) || depth >= self.max_depth {
            return Err(GalleryError::UnresolvableRecursion {
                url: url.to_string(),
            });
        }
        debug!(%url, target = %linked.url, "following reddit post");
        self.resolve_url(node, linked.url, Some(url.to_string()), depth + 1)
            .await
    }

    async fn probe_generic(
        &self,
        node: &BookmarkNode,
        url: &str,
        display_url: Option<String>,
    ) -> Result<ImageDescriptor, GalleryError> {
        let content_type = probe::content_type(self.http.as_ref(), url)
            .await
            .map_err(|e| GalleryError::upstream(Scheme::Generic, url, e))?;
        if !probe::is_image_type(content_type.as_deref()) {
            return Err(GalleryError::NotAnImage {
                url: url.to_string(),
                content_type,
            });
        }
        Ok(ImageDescriptor {
            source: node.clone(),
            scheme: Scheme::Generic,
            canonical_url: display_url.unwrap_or_else(|| url.to_string()),
            title: node.title.clone(),
            preview_url: None,
            width: None,
            height: None,
        })
    }
}

fn from_host(node: &BookmarkNode, scheme: Scheme, image: HostImage) -> ImageDescriptor {
    ImageDescriptor {
        source: node.clone(),
        scheme,
        canonical_url: image.url,
        title: image.title,
        preview_url: image.preview_url,
        width: image.width,
        height: image.height,
    }
}

/// Direct links need no lookup, only a few suffix fixes:
/// `.gifv` is served as `.gif`, twitter's `:large` gets a `:medium`
/// preview, and a trailing `&name=<size>` is dropped for the preview.
fn direct_image(node: &BookmarkNode, url: &str) -> ImageDescriptor {
    let (canonical, preview) = if let Some(stem) = url.strip_suffix(".gifv") {
        let gif = format!("{}.gif", stem);
        (gif.clone(), gif)
    } else if let Some(stem) = url.strip_suffix(":large") {
        (stem.to_string(), format!("{}:medium", stem))
    } else {
        (url.to_string(), strip_size_param(url).to_string())
    };
    let title = if node.title.is_empty() {
        url.rsplit('/').next().unwrap_or(url).to_string()
    } else {
        node.title.clone()
    };
    ImageDescriptor {
        source: node.clone(),
        scheme: Scheme::Direct,
        canonical_url: canonical,
        title,
        preview_url: Some(preview),
        width: None,
        height: None,
    }
}

fn strip_size_param(url: &str) -> &str {
    match url.rfind("&name=") {
        Some(idx) if !url[idx + 1..].contains('&') => &url[..idx],
        _ => url,
    }
}

fn instagram(node: &BookmarkNode, url: &str) -> Result<ImageDescriptor, GalleryError> {
    let malformed = |reason: &str| {
        GalleryError::upstream(
            Scheme::Instagram,
            url,
            ProviderError::MalformedUrl {
                url: url.to_string(),
                reason: reason.to_string(),
            },
        )
    };
    let start = url.find("/p/").ok_or_else(|| malformed("no post path"))? + 3;
    let id = url
        .get(start..start + INSTAGRAM_ID_LEN)
        .filter(|id| {
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .ok_or_else(|| malformed("post id is not 11 characters"))?;
    let base = format!("https://www.instagram.com/p/{}/media/", id);
    Ok(ImageDescriptor {
        source: node.clone(),
        scheme: Scheme::Instagram,
        canonical_url: format!("{}?size=l", base),
        title: node.title.clone(),
        preview_url: Some(format!("{}?size=m", base)),
        width: None,
        height: None,
    })
}
