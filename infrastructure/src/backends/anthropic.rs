//! Anthropic Messages API (`POST {base}/v1/messages`).

use super::http::{count, invalid, send_json};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use turnstile_application::{BackendClient, BackendError};
use turnstile_domain::{
    BackendDescriptor, BackendKind, ChatParameters, PromptPayload, RawReply, Usage,
    flatten_content,
};

const API_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    client: reqwest::Client,
    descriptor: BackendDescriptor,
    api_key: String,
}

impl AnthropicBackend {
    pub fn new(client: reqwest::Client, descriptor: BackendDescriptor) -> Result<Self, BackendError> {
        let api_key = descriptor.api_key.clone().ok_or_else(|| {
            BackendError::Configuration(format!(
                "backend `{}` is missing an Anthropic API key",
                descriptor.name
            ))
        })?;
        Ok(Self {
            client,
            descriptor,
            api_key,
        })
    }

    fn request_body(&self, payload: &PromptPayload, parameters: &ChatParameters) -> serde_json::Value {
        let d = &self.descriptor;
        let mut body = json!({
            "model": d.model,
            "messages": payload.messages,
            "max_tokens": parameters.max_tokens.unwrap_or(d.max_tokens),
        });
        if !payload.system.is_empty() {
            body["system"] = json!(payload.system);
        }
        if let Some(temperature) = parameters.temperature.or(d.temperature) {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

#[async_trait]
impl BackendClient for AnthropicBackend {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Anthropic
    }

    async fn chat(
        &self,
        payload: &PromptPayload,
        parameters: &ChatParameters,
    ) -> Result<RawReply, BackendError> {
        let body = self.request_body(payload, parameters);
        debug!(
            backend = %self.descriptor.name,
            model = %self.descriptor.model,
            messages_count = payload.messages.len(),
            "anthropic chat request"
        );

        let request = self
            .client
            .post(format!("{}/v1/messages", self.descriptor.endpoint_base()))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let resp = send_json(self.name(), request).await?;
        let content = &resp["content"];
        if !content.is_array() {
            return Err(invalid(self.name(), "response has no content array"));
        }

        let usage = &resp["usage"];
        Ok(RawReply::new(
            flatten_content(content),
            Usage::new(count(usage, "input_tokens"), count(usage, "output_tokens")),
        ))
    }
}
