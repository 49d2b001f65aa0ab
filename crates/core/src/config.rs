use crate::classifier::DEFAULT_PROBE_CONCURRENCY;
use crate::resolver::DEFAULT_MAX_REDIRECT_DEPTH;
use crate::tree::DEFAULT_SEARCH_LIMIT;
use serde::{Deserialize, Serialize};
use storage::ROOT_ID;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub http: HttpSettings,
    pub gallery: GallerySettings,
    pub credentials: CredentialConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Chromium `Bookmarks` JSON file.
    #[default]
    Chrome,
    /// Firefox `places.sqlite`.
    Places,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
    pub probe_concurrency: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: None,
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySettings {
    pub start_directory: String,
    pub search_limit: usize,
    pub max_redirect_depth: usize,
}

impl Default for GallerySettings {
    fn default() -> Self {
        Self {
            start_directory: ROOT_ID.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            max_redirect_depth: DEFAULT_MAX_REDIRECT_DEPTH,
        }
    }
}

/// Tokens and api keys for the hosts that require one. Refreshing them is
/// somebody else's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub pixiv_token: Option<String>,
    pub pixiv_client_id: Option<String>,
    pub pixiv_client_secret: Option<String>,
    pub pixiv_username: Option<String>,
    pub pixiv_password: Option<String>,
    pub pixiv_device_token: Option<String>,
    pub twitter_token: Option<String>,
    pub twitter_client_id: Option<String>,
    pub twitter_client_secret: Option<String>,
    pub flickr_api_key: Option<String>,
    pub tumblr_api_key: Option<String>,
    pub imgur_client_id: Option<String>,
}

/// Reads `path` (or the optional `config/default`), then `GALLERY__*`
/// environment variables, e.g. `GALLERY__STORE__PATH`.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("GALLERY").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
