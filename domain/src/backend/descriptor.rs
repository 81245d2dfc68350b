//! Backend descriptors: which backends exist and how to reach them.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire protocol spoken by a backend (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// OpenAI chat-completions and compatible servers (DeepSeek, vLLM, LM Studio)
    OpenAi,
    Anthropic,
    Ollama,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "openai",
            BackendKind::Anthropic => "anthropic",
            BackendKind::Ollama => "ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            BackendKind::OpenAi => "https://api.openai.com",
            BackendKind::Anthropic => "https://api.anthropic.com",
            BackendKind::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable consulted when no key is configured.
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            BackendKind::OpenAi => Some("OPENAI_API_KEY"),
            BackendKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            BackendKind::Ollama => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" | "openai-compatible" => Ok(BackendKind::OpenAi),
            "anthropic" => Ok(BackendKind::Anthropic),
            "ollama" => Ok(BackendKind::Ollama),
            _ => Err(DomainError::UnknownBackendKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendCapabilities {
    /// Ask the backend for a JSON object response.
    pub structured_output: bool,
    pub vision: bool,
}

/// One pool member as configured.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    /// Human-readable name used in logs and errors.
    pub name: String,
    pub base_url: String,
    pub model: String,
    /// Resolved API key, if any.
    pub api_key: Option<String>,
    pub max_tokens: u32,
    /// Per-backend override of the dispatch temperature.
    pub temperature: Option<f32>,
    pub enabled: bool,
    pub capabilities: BackendCapabilities,
}

impl BackendDescriptor {
    pub fn new(kind: BackendKind, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            base_url: kind.default_base_url().to_string(),
            model: model.into(),
            api_key: None,
            max_tokens: 1024,
            temperature: None,
            enabled: true,
            capabilities: BackendCapabilities::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// `base_url` without a trailing slash, ready for path concatenation.
    pub fn endpoint_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
