use crate::{Auth, HeadResponse, HttpClient, JsonResponse, ProviderError, RequestMode};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: concat!("bookmark-gallery/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `HttpClient` backed by reqwest. Credentialed requests share a cookie
/// store; anonymous ones go through a separate client that never sends any.
#[derive(Clone)]
pub struct ReqwestHttp {
    credentialed: Client,
    anonymous: Client,
    cfg: Arc<HttpConfig>,
}

impl ReqwestHttp {
    pub fn new(cfg: HttpConfig) -> Result<Self, ProviderError> {
        let build = |cookies: bool| {
            Client::builder()
                .timeout(cfg.timeout)
                .user_agent(cfg.user_agent.clone())
                .cookie_store(cookies)
                .build()
                .map_err(|e| ProviderError::RequestFailed {
                    url: String::new(),
                    reason: e.to_string(),
                })
        };
        Ok(Self {
            credentialed: build(true)?,
            anonymous: build(false)?,
            cfg: Arc::new(cfg),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.cfg
    }
}

fn with_auth(builder: RequestBuilder, auth: Option<&Auth>) -> RequestBuilder {
    match auth {
        Some(Auth::Bearer(token)) => builder.bearer_auth(token),
        Some(Auth::ClientId(id)) => builder.header("Authorization", format!("Client-ID {}", id)),
        Some(Auth::Basic { user, password }) => builder.basic_auth(user, Some(password)),
        None => builder,
    }
}

fn request_failed(url: &str) -> impl FnOnce(reqwest::Error) -> ProviderError + '_ {
    move |e| ProviderError::RequestFailed {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

async fn read_json(url: &str, resp: Response) -> Result<JsonResponse, ProviderError> {
    let status = resp.status().as_u16();
    let body: Bytes = resp.bytes().await.map_err(request_failed(url))?;
    let body = serde_json::from_slice(&body).map_err(|e| {
        ProviderError::decode(
            url,
            format!("status {} body {:?}: {}", status, String::from_utf8_lossy(&body), e),
        )
    })?;
    Ok(JsonResponse { status, body })
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttp {
    async fn get_json(
        &self,
        url: &str,
        auth: Option<&Auth>,
    ) -> Result<JsonResponse, ProviderError> {
        let resp = with_auth(self.credentialed.get(url), auth)
            .send()
            .await
            .map_err(request_failed(url))?;
        read_json(url, resp).await
    }

    async fn head(&self, url: &str, mode: RequestMode) -> Result<HeadResponse, ProviderError> {
        let client = match mode {
            RequestMode::Credentialed => &self.credentialed,
            RequestMode::Anonymous => &self.anonymous,
        };
        let resp = client.head(url).send().await.map_err(request_failed(url))?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(HeadResponse {
            status: resp.status().as_u16(),
            content_type,
        })
    }

    async fn post_form(
        &self,
        url: &str,
        auth: Option<&Auth>,
        form: &[(&str, &str)],
    ) -> Result<JsonResponse, ProviderError> {
        let resp = with_auth(self.anonymous.post(url), auth)
            .form(form)
            .send()
            .await
            .map_err(request_failed(url))?;
        read_json(url, resp).await
    }
}
