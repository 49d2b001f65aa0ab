use crate::{dimension, str_at, HostImage, HttpClient, ProviderError};

const REST_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

/// Photo id from `flickr.com/photos/<owner>/<id>/...`.
pub fn photo_id(url: &str) -> Option<String> {
    let start = url.find("/photos/")? + "/photos/".len();
    let mut segments = url[start..].split('/');
    let _owner = segments.next()?;
    let id: String = segments
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

pub fn sizes_url(id: &str, api_key: &str) -> String {
    format!(
        "{}?method=flickr.photos.getSizes&photo_id={}&api_key={}&format=json&nojsoncallback=1",
        REST_ENDPOINT, id, api_key
    )
}

/// Largest size becomes the canonical image, the size labelled "Medium" the
/// preview.
pub async fn fetch(
    http: &dyn HttpClient,
    page_url: &str,
    title: &str,
    api_key: &str,
) -> Result<HostImage, ProviderError> {
    let id = photo_id(page_url).ok_or_else(|| ProviderError::malformed(page_url, "no photo id"))?;
    let endpoint = sizes_url(&id, api_key);
    let resp = http.get_json(&endpoint, None).await?;
    let body = &resp.body;
    if str_at(body, "/stat") != Some("ok") {
        return Err(ProviderError::rejected(&endpoint, body));
    }
    let sizes = body
        .pointer("/sizes/size")
        .and_then(|s| s.as_array())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ProviderError::decode(&endpoint, "no sizes"))?;
    let largest = &sizes[sizes.len() - 1];
    let url = str_at(largest, "/source")
        .ok_or_else(|| ProviderError::decode(&endpoint, "largest size has no source"))?;
    let medium = sizes
        .iter()
        .find(|s| str_at(s, "/label") == Some("Medium"))
        .and_then(|s| str_at(s, "/source"));
    Ok(HostImage {
        url: url.to_string(),
        preview_url: medium.map(str::to_string),
        title: title.to_string(),
        width: dimension(largest.get("width")),
        height: dimension(largest.get("height")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;
    use serde_json::json;

    const PAGE: &str = "https://www.flickr.com/photos/someone/49123456789/in/explore/";

    #[test]
    fn photo_id_follows_owner() {
        assert_eq!(photo_id(PAGE).as_deref(), Some("49123456789"));
        assert_eq!(photo_id("https://www.flickr.com/photos/someone/"), None);
    }

    #[tokio::test]
    async fn picks_largest_and_medium() {
        let http = ScriptedHttp::new().with_json(
            &sizes_url("49123456789", "key"),
            json!({
                "stat": "ok",
                "sizes": {"size": [
                    {"label": "Small", "source": "https://live.staticflickr.com/s.jpg", "width": 240, "height": 160},
                    {"label": "Medium", "source": "https://live.staticflickr.com/m.jpg", "width": 500, "height": 333},
                    {"label": "Original", "source": "https://live.staticflickr.com/o.jpg", "width": "4000", "height": "2667"}
                ]}
            }),
        );
        let image = fetch(&http, PAGE, "Explore", "key").await.unwrap();
        assert_eq!(image.url, "https://live.staticflickr.com/o.jpg");
        assert_eq!(image.preview_url.as_deref(), Some("https://live.staticflickr.com/m.jpg"));
        assert_eq!((image.width, image.height), (Some(4000), Some(2667)));
        assert_eq!(image.title, "Explore");
    }

    #[tokio::test]
    async fn status_fail_is_rejected() {
        let http = ScriptedHttp::new().with_json(
            &sizes_url("49123456789", "key"),
            json!({"stat": "fail", "code": 1, "message": "Photo not found"}),
        );
        assert!(matches!(
            fetch(&http, PAGE, "", "key").await,
            Err(ProviderError::Rejected { .. })
        ));
    }
}
