//! `HttpClient` that answers from a script instead of the network. Used by
//! tests across the workspace.

use crate::{Auth, HeadResponse, HttpClient, JsonResponse, ProviderError, RequestMode};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum HeadScript {
    Always(Option<String>),
    AnonymousOnly(String),
}

#[derive(Debug, Default)]
pub struct ScriptedHttp {
    json: HashMap<String, JsonResponse>,
    heads: HashMap<String, HeadScript>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GET and POST requests to `url` with `body` and status 200.
    pub fn with_json(self, url: &str, body: serde_json::Value) -> Self {
        self.with_json_status(url, 200, body)
    }

    pub fn with_json_status(mut self, url: &str, status: u16, body: serde_json::Value) -> Self {
        self.json
            .insert(url.to_string(), JsonResponse { status, body });
        self
    }

    pub fn with_head(mut self, url: &str, content_type: Option<&str>) -> Self {
        self.heads.insert(
            url.to_string(),
            HeadScript::Always(content_type.map(str::to_string)),
        );
        self
    }

    /// Credentialed HEAD requests to `url` fail; anonymous ones succeed.
    pub fn with_anonymous_head(mut self, url: &str, content_type: &str) -> Self {
        self.heads.insert(
            url.to_string(),
            HeadScript::AnonymousOnly(content_type.to_string()),
        );
        self
    }

    /// Every request seen so far, as `"<METHOD> <url>"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn unscripted(url: &str) -> ProviderError {
        ProviderError::RequestFailed {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        }
    }

    fn json_for(&self, url: &str) -> Result<JsonResponse, ProviderError> {
        self.json
            .get(url)
            .cloned()
            .ok_or_else(|| Self::unscripted(url))
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedHttp {
    async fn get_json(
        &self,
        url: &str,
        auth: Option<&Auth>,
    ) -> Result<JsonResponse, ProviderError> {
        let call = match auth {
            Some(Auth::Bearer(token)) => format!("GET {} bearer={}", url, token),
            Some(Auth::ClientId(id)) => format!("GET {} client-id={}", url, id),
            Some(Auth::Basic { user, .. }) => format!("GET {} basic={}", url, user),
            None => format!("GET {}", url),
        };
        self.record(call);
        self.json_for(url)
    }

    async fn head(&self, url: &str, mode: RequestMode) -> Result<HeadResponse, ProviderError> {
        let label = match mode {
            RequestMode::Credentialed => "credentialed",
            RequestMode::Anonymous => "anonymous",
        };
        self.record(format!("HEAD {} {}", label, url));
        match (self.heads.get(url), mode) {
            (Some(HeadScript::Always(content_type)), _) => Ok(HeadResponse {
                status: 200,
                content_type: content_type.clone(),
            }),
            (Some(HeadScript::AnonymousOnly(content_type)), RequestMode::Anonymous) => {
                Ok(HeadResponse {
                    status: 200,
                    content_type: Some(content_type.clone()),
                })
            }
            _ => Err(Self::unscripted(url)),
        }
    }

    async fn post_form(
        &self,
        url: &str,
        _auth: Option<&Auth>,
        form: &[(&str, &str)],
    ) -> Result<JsonResponse, ProviderError> {
        let body: Vec<String> = form.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        self.record(format!("POST {} {}", url, body.join("&")));
        self.json_for(url)
    }
}
