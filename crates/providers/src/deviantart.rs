use crate::{dimension, str_at, HostImage, HttpClient, ProviderError};
use url::Url;

const OEMBED_ENDPOINT: &str = "https://backend.deviantart.com/oembed";

pub fn oembed_url(page_url: &str) -> Result<String, ProviderError> {
    let url = Url::parse_with_params(OEMBED_ENDPOINT, &[("url", page_url), ("format", "json")])
        .map_err(|e| ProviderError::malformed(page_url, e.to_string()))?;
    Ok(url.into())
}

/// Resolves a deviation page through the public oEmbed endpoint.
pub async fn fetch(http: &dyn HttpClient, page_url: &str) -> Result<HostImage, ProviderError> {
    let endpoint = oembed_url(page_url)?;
    let resp = http.get_json(&endpoint, None).await?;
    if !resp.is_success() {
        return Err(ProviderError::rejected(&endpoint, &resp.body));
    }
    let body = &resp.body;
    let url = str_at(body, "/url").ok_or_else(|| ProviderError::decode(&endpoint, "no url"))?;
    let author = str_at(body, "/author_name").unwrap_or_default();
    let title = str_at(body, "/title").unwrap_or_default();
    Ok(HostImage {
        url: url.to_string(),
        preview_url: str_at(body, "/thumbnail_url").map(str::to_string),
        title: format!("{}: {}", author, title),
        width: dimension(body.get("width")),
        height: dimension(body.get("height")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;
    use serde_json::json;

    const PAGE: &str = "https://www.deviantart.com/someone/art/Piece-1";

    #[test]
    fn encodes_page_url() {
        assert_eq!(
            oembed_url("https://a.b/c d").unwrap(),
            "https://backend.deviantart.com/oembed?url=https%3A%2F%2Fa.b%2Fc+d&format=json"
        );
    }

    #[tokio::test]
    async fn maps_oembed_fields() {
        let http = ScriptedHttp::new().with_json(
            &oembed_url(PAGE).unwrap(),
            json!({
                "url": "https://images.example/full.jpg",
                "thumbnail_url": "https://images.example/thumb.jpg",
                "author_name": "someone",
                "title": "Piece",
                "width": "1200",
                "height": 800
            }),
        );
        let image = fetch(&http, PAGE).await.unwrap();
        assert_eq!(image.url, "https://images.example/full.jpg");
        assert_eq!(image.preview_url.as_deref(), Some("https://images.example/thumb.jpg"));
        assert_eq!(image.title, "someone: Piece");
        assert_eq!((image.width, image.height), (Some(1200), Some(800)));
    }

    #[tokio::test]
    async fn error_status_is_rejected() {
        let http = ScriptedHttp::new().with_json_status(
            &oembed_url(PAGE).unwrap(),
            404,
            json!({"error": "not found"}),
        );
        assert!(matches!(
            fetch(&http, PAGE).await,
            Err(ProviderError::Rejected { .. })
        ));
    }
}
