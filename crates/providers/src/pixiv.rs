use crate::{digits_after, str_at, Auth, HostImage, HttpClient, ProviderError};

const WORKS_ENDPOINT: &str = "https://public-api.secure.pixiv.net/v1/works";
const TOKEN_ENDPOINT: &str = "https://oauth.secure.pixiv.net/auth/token";

/// App and account credentials for the password grant.
#[derive(Debug, Clone)]
pub struct PixivLogin {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    /// Returned by an earlier login; sending it back avoids a new-device mail.
    pub device_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixivToken {
    pub access_token: String,
    pub device_token: Option<String>,
}

/// Work id from either `...member_illust.php?mode=medium&illust_id=<id>` or
/// `.../artworks/<id>`.
pub fn work_id(url: &str) -> Option<String> {
    digits_after(url, "illust_id=").or_else(|| digits_after(url, "/artworks/"))
}

pub fn works_url(id: &str) -> String {
    format!("{}/{}.json?image_sizes=medium,large", WORKS_ENDPOINT, id)
}

pub async fn fetch(
    http: &dyn HttpClient,
    page_url: &str,
    token: &str,
) -> Result<HostImage, ProviderError> {
    let id = work_id(page_url).ok_or_else(|| ProviderError::malformed(page_url, "no work id"))?;
    let endpoint = works_url(&id);
    let resp = http
        .get_json(&endpoint, Some(&Auth::Bearer(token.to_string())))
        .await?;
    let body = &resp.body;
    if str_at(body, "/status") != Some("success") {
        return Err(ProviderError::rejected(&endpoint, body));
    }
    let work = body
        .pointer("/response/0")
        .ok_or_else(|| ProviderError::decode(&endpoint, "empty response"))?;
    let large = str_at(work, "/image_urls/large")
        .ok_or_else(|| ProviderError::decode(&endpoint, "no large image"))?;
    Ok(HostImage {
        url: large.to_string(),
        preview_url: str_at(work, "/image_urls/medium").map(str::to_string),
        title: format!(
            "{} - {}",
            str_at(work, "/user/name").unwrap_or_default(),
            str_at(work, "/title").unwrap_or_default()
        ),
        width: crate::dimension(work.get("width")),
        height: crate::dimension(work.get("height")),
    })
}

/// Logs in with the password grant. Storing the result is up to the caller.
pub async fn fetch_token(
    http: &dyn HttpClient,
    login: &PixivLogin,
) -> Result<PixivToken, ProviderError> {
    if login.username.is_empty() || login.password.is_empty() {
        return Err(ProviderError::malformed(TOKEN_ENDPOINT, "no username or password"));
    }
    let mut form = vec![
        ("client_id", login.client_id.as_str()),
        ("client_secret", login.client_secret.as_str()),
        ("grant_type", "password"),
        ("username", login.username.as_str()),
        ("password", login.password.as_str()),
    ];
    if let Some(device) = login.device_token.as_deref() {
        form.push(("device_token", device));
    }
    let resp = http.post_form(TOKEN_ENDPOINT, None, &form).await?;
    let access_token = str_at(&resp.body, "/response/access_token")
        .ok_or_else(|| ProviderError::rejected(TOKEN_ENDPOINT, &resp.body))?;
    Ok(PixivToken {
        access_token: access_token.to_string(),
        device_token: str_at(&resp.body, "/response/device_token").map(str::to_string),
    })
}
