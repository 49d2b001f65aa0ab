use crate::{Auth, HeadResponse, HttpClient, JsonResponse, ProviderError, RequestMode};

/// Refuses every request. Lets the gallery run without touching the network.
#[derive(Debug, Default)]
pub struct OfflineHttp;

fn offline(url: &str) -> ProviderError {
    ProviderError::RequestFailed {
        url: url.to_string(),
        reason: "offline".to_string(),
    }
}

#[async_trait::async_trait]
impl HttpClient for OfflineHttp {
    async fn get_json(
        &self,
        url: &str,
        _auth: Option<&Auth>,
    ) -> Result<JsonResponse, ProviderError> {
        Err(offline(url))
    }

    async fn head(&self, url: &str, _mode: RequestMode) -> Result<HeadResponse, ProviderError> {
        Err(offline(url))
    }

    async fn post_form(
        &self,
        url: &str,
        _auth: Option<&Auth>,
        _form: &[(&str, &str)],
    ) -> Result<JsonResponse, ProviderError> {
        Err(offline(url))
    }
}
