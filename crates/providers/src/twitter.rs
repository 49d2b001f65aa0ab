use crate::{digits_after, str_at, Auth, HostImage, HttpClient, ProviderError};

const LOOKUP_ENDPOINT: &str = "https://api.twitter.com/1.1/statuses/lookup.json";
const TOKEN_ENDPOINT: &str = "https://api.twitter.com/oauth2/token";

pub fn status_id(url: &str) -> Option<String> {
    digits_after(url, "/status/")
}

pub fn lookup_url(id: &str) -> String {
    format!("{}?id={}&trim_user=1", LOOKUP_ENDPOINT, id)
}

/// First attached media of a status; the `:medium` size doubles as preview.
pub async fn fetch(
    http: &dyn HttpClient,
    page_url: &str,
    title: &str,
    token: &str,
) -> Result<HostImage, ProviderError> {
    let id = status_id(page_url).ok_or_else(|| ProviderError::malformed(page_url, "no status id"))?;
    let endpoint = lookup_url(&id);
    let resp = http
        .get_json(&endpoint, Some(&Auth::Bearer(token.to_string())))
        .await?;
    let media_url = str_at(&resp.body, "/0/entities/media/0/media_url")
        .ok_or_else(|| ProviderError::rejected(&endpoint, &resp.body))?;
    Ok(HostImage {
        url: media_url.to_string(),
        preview_url: Some(format!("{}:medium", media_url)),
        title: title.to_string(),
        width: None,
        height: None,
    })
}

/// Exchanges app credentials for a bearer token (client-credentials grant).
pub async fn fetch_app_token(
    http: &dyn HttpClient,
    client_id: &str,
    client_secret: &str,
) -> Result<String, ProviderError> {
    let auth = Auth::Basic {
        user: client_id.to_string(),
        password: client_secret.to_string(),
    };
    let resp = http
        .post_form(TOKEN_ENDPOINT, Some(&auth), &[("grant_type", "client_credentials")])
        .await?;
    str_at(&resp.body, "/access_token")
        .map(str::to_string)
        .ok_or_else(|| ProviderError::rejected(TOKEN_ENDPOINT, &resp.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;
    use serde_json::json;

    const STATUS: &str = "https://twitter.com/someone/status/1287733270000000000/photo/1";

    #[tokio::test]
    async fn first_media_entity_wins() {
        let http = ScriptedHttp::new().with_json(
            &lookup_url("1287733270000000000"),
            json!([{"entities": {"media": [
                {"media_url": "http://pbs.twimg.com/media/Ab.jpg"},
                {"media_url": "http://pbs.twimg.com/media/Cd.jpg"}
            ]}}]),
        );
        let image = fetch(&http, STATUS, "tweet", "tok").await.unwrap();
        assert_eq!(image.url, "http://pbs.twimg.com/media/Ab.jpg");
        assert_eq!(
            image.preview_url.as_deref(),
            Some("http://pbs.twimg.com/media/Ab.jpg:medium")
        );
    }

    #[tokio::test]
    async fn status_without_media_fails() {
        let http = ScriptedHttp::new().with_json(
            &lookup_url("1287733270000000000"),
            json!([{"entities": {"hashtags": []}}]),
        );
        assert!(matches!(
            fetch(&http, STATUS, "tweet", "tok").await,
            Err(ProviderError::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn app_token_uses_client_credentials() {
        let http = ScriptedHttp::new().with_json(
            TOKEN_ENDPOINT,
            json!({"token_type": "bearer", "access_token": "AAAA"}),
        );
        assert_eq!(fetch_app_token(&http, "id", "secret").await.unwrap(), "AAAA");
        assert_eq!(
            http.calls(),
            vec![format!("POST {} grant_type=client_credentials", TOKEN_ENDPOINT)]
        );

        let refused = ScriptedHttp::new().with_json(TOKEN_ENDPOINT, json!({"errors": []}));
        assert!(fetch_app_token(&refused, "id", "secret").await.is_err());
    }
}
