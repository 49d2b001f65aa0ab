//! Content-type probe: a HEAD request that tells whether a url serves an image.

use crate::{HttpClient, ProviderError, RequestMode};
use tracing::debug;

/// Declared content type of `url`. A refused credentialed request is retried
/// once anonymously.
pub async fn content_type(
    http: &dyn HttpClient,
    url: &str,
) -> Result<Option<String>, ProviderError> {
    let resp = match http.head(url, RequestMode::Credentialed).await {
        Ok(resp) => resp,
        Err(first) => {
            debug!(%url, error = %first, "credentialed probe failed, retrying anonymously");
            http.head(url, RequestMode::Anonymous).await?
        }
    };
    Ok(resp.content_type)
}

pub fn is_image_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|t| t.trim().to_ascii_lowercase().starts_with("image/"))
        .unwrap_or(false)
}

pub async fn is_image(http: &dyn HttpClient, url: &str) -> Result<bool, ProviderError> {
    let content_type = content_type(http, url).await?;
    Ok(is_image_type(content_type.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;

    #[tokio::test]
    async fn retries_without_credentials() {
        let http = ScriptedHttp::new().with_anonymous_head("https://a.example/pic", "image/png");
        assert!(is_image(&http, "https://a.example/pic").await.unwrap());
        assert_eq!(
            http.calls(),
            vec![
                "HEAD credentialed https://a.example/pic",
                "HEAD anonymous https://a.example/pic"
            ]
        );
    }

    #[tokio::test]
    async fn non_image_and_failures() {
        let http = ScriptedHttp::new().with_head("https://a.example/page", Some("text/html"));
        assert!(!is_image(&http, "https://a.example/page").await.unwrap());
        assert!(is_image(&http, "https://a.example/unscripted").await.is_err());
    }

    #[test]
    fn image_prefix_is_case_insensitive() {
        assert!(is_image_type(Some("Image/JPEG")));
        assert!(!is_image_type(Some("text/html; charset=utf-8")));
        assert!(!is_image_type(None));
    }
}
