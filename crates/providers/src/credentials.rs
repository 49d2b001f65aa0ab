use crate::Scheme;
use std::collections::HashMap;

/// Supplies the token or api key a host needs. Storage and refresh of the
/// credentials live outside this crate.
pub trait CredentialSource: Send + Sync {
    fn credential(&self, scheme: Scheme) -> Option<String>;
}

/// Fixed credentials, typically read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    values: HashMap<Scheme, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank values are ignored so an empty config entry reads as missing.
    pub fn with(mut self, scheme: Scheme, value: Option<String>) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.values.insert(scheme, value);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CredentialSource for StaticCredentials {
    fn credential(&self, scheme: Scheme) -> Option<String> {
        self.values.get(&scheme).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        let creds = StaticCredentials::new()
            .with(Scheme::Pixiv, Some("  ".into()))
            .with(Scheme::Twitter, Some("token".into()))
            .with(Scheme::Imgur, None);
        assert_eq!(creds.credential(Scheme::Pixiv), None);
        assert_eq!(creds.credential(Scheme::Twitter).as_deref(), Some("token"));
        assert_eq!(creds.credential(Scheme::Imgur), None);
    }
}
