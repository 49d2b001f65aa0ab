use crate::{str_at, strip_query, HttpClient, ProviderError};

/// The link a reddit post points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPost {
    pub url: String,
    pub title: String,
}

pub fn listing_url(post_url: &str) -> String {
    format!("{}.json?limit=1", strip_query(post_url).trim_end_matches('/'))
}

pub async fn fetch_link(
    http: &dyn HttpClient,
    post_url: &str,
) -> Result<LinkedPost, ProviderError> {
    let endpoint = listing_url(post_url);
    let resp = http.get_json(&endpoint, None).await?;
    let body = &resp.body;
    if !resp.is_success() || body.get("error").is_some() {
        return Err(ProviderError::rejected(&endpoint, body));
    }
    // Post pages answer with [post listing, comments listing].
    let listing = if body.is_array() {
        body.get(0)
            .ok_or_else(|| ProviderError::decode(&endpoint, "empty listing"))?
    } else {
        body
    };
    let post = listing
        .pointer("/data/children/0/data")
        .ok_or_else(|| ProviderError::decode(&endpoint, "listing has no posts"))?;
    let url = str_at(post, "/url").ok_or_else(|| ProviderError::decode(&endpoint, "post has no url"))?;
    Ok(LinkedPost {
        url: url.to_string(),
        title: str_at(post, "/title").unwrap_or_default().to_string(),
    })
}
