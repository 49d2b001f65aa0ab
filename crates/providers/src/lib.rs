//! Clients for the third-party hosts that serve bookmarked images, and the
//! HTTP seam they share.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod credentials;
pub mod deviantart;
pub mod flickr;
pub mod http;
pub mod imgur;
pub mod noop;
pub mod pixiv;
pub mod probe;
pub mod reddit;
pub mod scripted;
pub mod tumblr;
pub mod twitter;

pub use credentials::{CredentialSource, StaticCredentials};
pub use http::ReqwestHttp;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },
    #[error("{url} answered with an error: {body}")]
    Rejected { url: String, body: String },
    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("cannot read {url}: {reason}")]
    MalformedUrl { url: String, reason: String },
}

impl ProviderError {
    pub(crate) fn decode(url: &str, reason: impl Into<String>) -> Self {
        ProviderError::Decode {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(url: &str, reason: impl Into<String>) -> Self {
        ProviderError::MalformedUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(url: &str, body: &serde_json::Value) -> Self {
        ProviderError::Rejected {
            url: url.to_string(),
            body: body.to_string(),
        }
    }
}

/// Hosting scheme a bookmarked url belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Direct,
    DeviantArt,
    Pixiv,
    Instagram,
    Flickr,
    Tumblr,
    Imgur,
    Reddit,
    Twitter,
    /// No recognizer matched; only a content-type probe can tell.
    Generic,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scheme::Direct => "direct",
            Scheme::DeviantArt => "deviantart",
            Scheme::Pixiv => "pixiv",
            Scheme::Instagram => "instagram",
            Scheme::Flickr => "flickr",
            Scheme::Tumblr => "tumblr",
            Scheme::Imgur => "imgur",
            Scheme::Reddit => "reddit",
            Scheme::Twitter => "twitter",
            Scheme::Generic => "generic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Bearer(String),
    ClientId(String),
    Basic { user: String, password: String },
}

/// Whether a request carries cookies and credentials. Anonymous requests are
/// the fallback when a credentialed one is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    Credentialed,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl JsonResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadResponse {
    pub status: u16,
    pub content_type: Option<String>,
}

#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get_json(&self, url: &str, auth: Option<&Auth>)
        -> Result<JsonResponse, ProviderError>;

    async fn head(&self, url: &str, mode: RequestMode) -> Result<HeadResponse, ProviderError>;

    async fn post_form(
        &self,
        url: &str,
        auth: Option<&Auth>,
        form: &[(&str, &str)],
    ) -> Result<JsonResponse, ProviderError>;
}

/// What a host reports for one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostImage {
    pub url: String,
    pub preview_url: Option<String>,
    pub title: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Reads a string at a JSON pointer.
pub(crate) fn str_at<'a>(value: &'a serde_json::Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(|v| v.as_str())
}

/// Reads a dimension that hosts send either as a number or as a string.
pub(crate) fn dimension(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Digits immediately following `marker` in `url`.
pub(crate) fn digits_after(url: &str, marker: &str) -> Option<String> {
    let start = url.find(marker)? + marker.len();
    let id: String = url[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Cuts the query string (and fragment) off a url.
pub fn strip_query(url: &str) -> &str {
    let end = url.find(&['?', '#'][..]).unwrap_or(url.len());
    &url[..end]
}
