//! Wiring from configuration to a ready `Gallery`.

use crate::config::{AppConfig, CredentialConfig, StoreKind};
use crate::navigator::Gallery;
use crate::resolver::Resolver;
use crate::tree::TreeProvider;
use anyhow::{bail, Context};
use providers::http::HttpConfig;
use providers::noop::OfflineHttp;
use providers::{HttpClient, ReqwestHttp, Scheme, StaticCredentials};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use storage::{ChromeBookmarks, PlacesStore, TreeStore};
use tracing::info;

pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn TreeStore>> {
    let Some(path) = config.store.path.as_deref() else {
        bail!("store.path is not configured (set it in the config file or GALLERY__STORE__PATH)");
    };
    info!(kind = ?config.store.kind, path, "opening bookmark store");
    let store: Arc<dyn TreeStore> = match config.store.kind {
        StoreKind::Chrome => Arc::new(
            ChromeBookmarks::open(Path::new(path))
                .with_context(|| format!("reading chrome bookmarks {}", path))?,
        ),
        StoreKind::Places => Arc::new(
            PlacesStore::connect(path)
                .await
                .with_context(|| format!("opening places database {}", path))?,
        ),
    };
    Ok(store)
}

/// `offline` swaps in a client that refuses every request, so only
/// recognizers that need no network can produce images.
pub fn build_http(config: &AppConfig, offline: bool) -> anyhow::Result<Arc<dyn HttpClient>> {
    if offline {
        return Ok(Arc::new(OfflineHttp));
    }
    let mut http = HttpConfig {
        timeout: Duration::from_secs(config.http.timeout_secs),
        ..Default::default()
    };
    if let Some(agent) = &config.http.user_agent {
        http.user_agent = agent.clone();
    }
    Ok(Arc::new(ReqwestHttp::new(http).context("building http client")?))
}

pub fn build_credentials(config: &CredentialConfig) -> StaticCredentials {
    StaticCredentials::new()
        .with(Scheme::Pixiv, config.pixiv_token.clone())
        .with(Scheme::Twitter, config.twitter_token.clone())
        .with(Scheme::Flickr, config.flickr_api_key.clone())
        .with(Scheme::Tumblr, config.tumblr_api_key.clone())
        .with(Scheme::Imgur, config.imgur_client_id.clone())
}

pub fn build_gallery(
    config: &AppConfig,
    store: Arc<dyn TreeStore>,
    http: Arc<dyn HttpClient>,
) -> Gallery {
    let tree = TreeProvider::new(store).with_search_limit(config.gallery.search_limit);
    let resolver = Resolver::new(http, Arc::new(build_credentials(&config.credentials)))
        .with_max_depth(config.gallery.max_redirect_depth);
    Gallery::new(tree, resolver).with_probe_concurrency(config.http.probe_concurrency)
}
