//! Backend configuration from TOML (`[[backends]]` array)

use serde::{Deserialize, Serialize};
use turnstile_domain::{BackendCapabilities, BackendDescriptor, BackendKind};

fn default_max_tokens() -> u32 {
    1024
}

fn default_enabled() -> bool {
    true
}

/// One pool member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBackendConfig {
    /// Wire protocol: "openai", "anthropic" or "ollama"
    pub kind: BackendKind,
    /// Name used in logs (default: "<kind>-<index>")
    #[serde(default)]
    pub name: Option<String>,
    /// Base URL (default depends on `kind`)
    #[serde(default)]
    pub base_url: Option<String>,
    pub model: String,
    /// Environment variable holding the API key (default depends on `kind`)
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Direct API key (prefer `api_key_env`)
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub capabilities: BackendCapabilities,
}

impl FileBackendConfig {
    pub fn display_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", self.kind, index))
    }

    /// Environment variable consulted for the key, if any.
    pub fn key_env(&self) -> Option<&str> {
        self.api_key_env
            .as_deref()
            .or_else(|| self.kind.default_api_key_env())
    }

    /// Build the descriptor, resolving the API key from the environment
    /// when none is configured inline.
    pub fn to_descriptor(&self, index: usize) -> BackendDescriptor {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| self.key_env().and_then(|var| std::env::var(var).ok()))
            .filter(|k| !k.is_empty());

        BackendDescriptor {
            kind: self.kind,
            name: self.display_name(index),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| self.kind.default_base_url().to_string()),
            model: self.model.clone(),
            api_key,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            enabled: self.enabled,
            capabilities: self.capabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        let toml_str = r#"
kind = "ollama"
model = "qwen2.5:7b"
"#;
        let config: FileBackendConfig = toml::from_str(toml_str).unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_tokens, 1024);

        let descriptor = config.to_descriptor(3);
        assert_eq!(descriptor.name, "ollama-3");
        assert_eq!(descriptor.base_url, "http://localhost:11434");
        assert!(descriptor.api_key.is_none());
    }

    #[test]
    fn test_inline_key_and_capabilities() {
        let toml_str = r#"
kind = "openai"
name = "deepseek"
base_url = "https://api.deepseek.com"
model = "deepseek-chat"
api_key = "sk-test"

[capabilities]
structured_output = true
"#;
        let config: FileBackendConfig = toml::from_str(toml_str).unwrap();
        let descriptor = config.to_descriptor(0);
        assert_eq!(descriptor.name, "deepseek");
        assert_eq!(descriptor.api_key.as_deref(), Some("sk-test"));
        assert!(descriptor.capabilities.structured_output);
        assert!(!descriptor.capabilities.vision);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let toml_str = r#"
kind = "gemini"
model = "x"
"#;
        assert!(toml::from_str::<FileBackendConfig>(toml_str).is_err());
    }

    #[test]
    fn test_key_env_falls_back_to_kind_default() {
        let config: FileBackendConfig = toml::from_str("kind = \"anthropic\"\nmodel = \"m\"").unwrap();
        assert_eq!(config.key_env(), Some("ANTHROPIC_API_KEY"));
    }
}
