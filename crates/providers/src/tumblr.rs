use crate::{dimension, str_at, HostImage, HttpClient, ProviderError};

const BLOG_ENDPOINT: &str = "https://api.tumblr.com/v2/blog";
const PREVIEW_MAX_WIDTH: u64 = 500;

/// Blog name and post id from `https://<blog>.tumblr.com/post/<id>/...`.
pub fn post_ref(url: &str) -> Option<(String, String)> {
    let host_start = url.find("://").map(|i| i + 3).unwrap_or(0);
    let rest = &url[host_start..];
    let blog = rest.split('.').next().filter(|b| !b.is_empty())?;
    let post_start = url.find("/post/")? + "/post/".len();
    let id = url[post_start..]
        .split(&['/', '?', '#'][..])
        .next()
        .filter(|id| !id.is_empty())?;
    Some((blog.to_string(), id.to_string()))
}

pub fn post_url(blog: &str, id: &str, api_key: &str) -> String {
    format!(
        "{}/{}/posts/photo?id={}&api_key={}",
        BLOG_ENDPOINT, blog, id, api_key
    )
}

pub async fn fetch(
    http: &dyn HttpClient,
    page_url: &str,
    title: &str,
    api_key: &str,
) -> Result<HostImage, ProviderError> {
    let (blog, id) =
        post_ref(page_url).ok_or_else(|| ProviderError::malformed(page_url, "no blog post"))?;
    let endpoint = post_url(&blog, &id, api_key);
    let resp = http.get_json(&endpoint, None).await?;
    let body = &resp.body;
    if body.pointer("/meta/status").and_then(|s| s.as_u64()) != Some(200) {
        return Err(ProviderError::rejected(&endpoint, body));
    }
    let photo = body
        .pointer("/response/posts/0/photos/0")
        .ok_or_else(|| ProviderError::decode(&endpoint, "post has no photos"))?;
    let original = photo
        .get("original_size")
        .ok_or_else(|| ProviderError::decode(&endpoint, "no original size"))?;
    let url = str_at(original, "/url")
        .ok_or_else(|| ProviderError::decode(&endpoint, "original size has no url"))?;
    let preview = photo
        .get("alt_sizes")
        .and_then(|s| s.as_array())
        .and_then(|sizes| {
            sizes.iter().find(|s| {
                s.get("width")
                    .and_then(|w| w.as_u64())
                    .map(|w| w <= PREVIEW_MAX_WIDTH)
                    .unwrap_or(false)
            })
        })
        .and_then(|s| str_at(s, "/url"));
    Ok(HostImage {
        url: url.to_string(),
        preview_url: preview.map(str::to_string),
        title: title.to_string(),
        width: dimension(original.get("width")),
        height: dimension(original.get("height")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;
    use serde_json::json;

    const PAGE: &str = "https://someblog.tumblr.com/post/123456789/a-title";

    #[test]
    fn reads_blog_and_post() {
        assert_eq!(
            post_ref(PAGE),
            Some(("someblog".to_string(), "123456789".to_string()))
        );
        assert_eq!(
            post_ref("https://someblog.tumblr.com/post/42"),
            Some(("someblog".to_string(), "42".to_string()))
        );
        assert_eq!(post_ref("https://someblog.tumblr.com/archive"), None);
    }

    #[tokio::test]
    async fn preview_is_first_size_within_500() {
        let http = ScriptedHttp::new().with_json(
            &post_url("someblog", "123456789", "key"),
            json!({
                "meta": {"status": 200, "msg": "OK"},
                "response": {"posts": [{"photos": [{
                    "original_size": {"url": "https://64.media.tumblr.com/1280.jpg", "width": 1280, "height": 720},
                    "alt_sizes": [
                        {"url": "https://64.media.tumblr.com/1280.jpg", "width": 1280},
                        {"url": "https://64.media.tumblr.com/500.jpg", "width": 500},
                        {"url": "https://64.media.tumblr.com/250.jpg", "width": 250}
                    ]
                }]}]}
            }),
        );
        let image = fetch(&http, PAGE, "post", "key").await.unwrap();
        assert_eq!(image.url, "https://64.media.tumblr.com/1280.jpg");
        assert_eq!(image.preview_url.as_deref(), Some("https://64.media.tumblr.com/500.jpg"));
        assert_eq!(image.width, Some(1280));
    }

    #[tokio::test]
    async fn non_200_meta_is_rejected() {
        let http = ScriptedHttp::new().with_json(
            &post_url("someblog", "123456789", "key"),
            json!({"meta": {"status": 404, "msg": "Not Found"}, "response": []}),
        );
        assert!(matches!(
            fetch(&http, PAGE, "post", "key").await,
            Err(ProviderError::Rejected { .. })
        ));
    }
}
