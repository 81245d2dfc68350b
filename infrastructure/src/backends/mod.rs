//! HTTP adapters for the [`BackendClient`](turnstile_application::BackendClient) port.

mod anthropic;
mod factory;
mod http;
mod ollama;
mod openai_compat;

pub use anthropic::AnthropicBackend;
pub use factory::HttpBackendFactory;
pub use ollama::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;
