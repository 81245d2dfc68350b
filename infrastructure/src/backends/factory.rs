//! Builds HTTP backend clients from descriptors.

use super::{AnthropicBackend, OllamaBackend, OpenAiCompatBackend};
use std::sync::Arc;
use turnstile_application::{BackendClient, BackendError, BackendFactory};
use turnstile_domain::{BackendDescriptor, BackendKind};

/// All clients built by one factory share its connection pool.
#[derive(Clone)]
pub struct HttpBackendFactory {
    client: reqwest::Client,
}

impl HttpBackendFactory {
    pub fn new() -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("turnstile/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl BackendFactory for HttpBackendFactory {
    fn build(&self, descriptor: &BackendDescriptor) -> Result<Arc<dyn BackendClient>, BackendError> {
        if descriptor.model.trim().is_empty() {
            return Err(BackendError::Configuration(format!(
                "backend `{}` has no model",
                descriptor.name
            )));
        }

        let client = self.client.clone();
        let descriptor = descriptor.clone();
        Ok(match descriptor.kind {
            BackendKind::OpenAi => Arc::new(OpenAiCompatBackend::new(client, descriptor)),
            BackendKind::Anthropic => Arc::new(AnthropicBackend::new(client, descriptor)?),
            BackendKind::Ollama => Arc::new(OllamaBackend::new(client, descriptor)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turnstile_application::BackendPool;

    #[test]
    fn test_builds_each_kind() {
        let factory = HttpBackendFactory::with_client(reqwest::Client::new());
        let descriptors = [
            BackendDescriptor::new(BackendKind::OpenAi, "a", "gpt-4o-mini"),
            BackendDescriptor::new(BackendKind::Anthropic, "b", "claude").with_api_key("k"),
            BackendDescriptor::new(BackendKind::Ollama, "c", "qwen2.5"),
        ];
        for d in &descriptors {
            let client = factory.build(d).unwrap();
            assert_eq!(client.name(), d.name);
            assert_eq!(client.kind(), d.kind);
        }
    }

    #[test]
    fn test_pool_configure_is_all_or_nothing() {
        let factory = HttpBackendFactory::with_client(reqwest::Client::new());
        let pool = BackendPool::default();
        let ok = [BackendDescriptor::new(BackendKind::Ollama, "c", "qwen2.5")];
        assert_eq!(pool.configure(&ok, &factory).unwrap(), 1);

        let broken = [
            BackendDescriptor::new(BackendKind::OpenAi, "a", "gpt-4o-mini"),
            BackendDescriptor::new(BackendKind::Anthropic, "b", "claude"),
        ];
        assert!(pool.configure(&broken, &factory).is_err());
        assert_eq!(pool.names(), vec!["c".to_string()]);
    }
}
