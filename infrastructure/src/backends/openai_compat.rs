//! OpenAI-compatible chat completions (`POST {base}/v1/chat/completions`).
//!
//! Also serves DeepSeek, vLLM, LM Studio and other servers that speak the
//! same wire format.

use super::http::{count, invalid, send_json};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use turnstile_application::{BackendClient, BackendError};
use turnstile_domain::{
    BackendDescriptor, BackendKind, ChatParameters, PromptPayload, RawReply, Usage,
    flatten_content,
};

pub struct OpenAiCompatBackend {
    client: reqwest::Client,
    descriptor: BackendDescriptor,
}

impl OpenAiCompatBackend {
    pub fn new(client: reqwest::Client, descriptor: BackendDescriptor) -> Self {
        Self { client, descriptor }
    }

    fn request_body(&self, payload: &PromptPayload, parameters: &ChatParameters) -> serde_json::Value {
        let d = &self.descriptor;
        let mut body = json!({
            "model": d.model,
            "messages": payload.with_system_message(),
            "max_tokens": parameters.max_tokens.unwrap_or(d.max_tokens),
        });
        if let Some(temperature) = parameters.temperature.or(d.temperature) {
            body["temperature"] = json!(temperature);
        }
        if d.capabilities.structured_output {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }
}

#[async_trait]
impl BackendClient for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::OpenAi
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
            "openai chat request"
        );

        let mut request = self
            .client
            .post(format!("{}/v1/chat/completions", self.descriptor.endpoint_base()))
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.descriptor.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let resp = send_json(self.name(), request).await?;
        let message = &resp["choices"][0]["message"];
        if message.is_null() {
            return Err(invalid(self.name(), "response has no choices[0].message"));
        }

        let usage = &resp["usage"];
        Ok(RawReply::new(
            flatten_content(&message["content"]),
            Usage::new(count(usage, "prompt_tokens"), count(usage, "completion_tokens")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use turnstile_domain::{BackendCapabilities, PromptMessage};

    fn payload() -> PromptPayload {
        PromptPayload {
            system: "be brief".into(),
            messages: vec![PromptMessage::user("[]")],
        }
    }

    fn backend(base_url: &str, structured: bool) -> OpenAiCompatBackend {
        let descriptor = BackendDescriptor::new(BackendKind::OpenAi, "main", "gpt-4o-mini")
            .with_base_url(base_url)
            .with_api_key("sk-test")
            .with_capabilities(BackendCapabilities {
                structured_output: structured,
                vision: false,
            });
        OpenAiCompatBackend::new(reqwest::Client::new(), descriptor)
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "[]"}
                ],
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"{\"status\":\"skip\"}"}}],
                    "usage":{"prompt_tokens":12,"completion_tokens":4}}"#,
            )
            .create_async()
            .await;

        let reply = backend(&server.url(), true)
            .chat(&payload(), &ChatParameters::default())
            .await
            .unwrap();

        assert_eq!(reply.role_content, r#"{"status":"skip"}"#);
        assert_eq!(reply.usage, Usage::new(12, 4));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_content_parts_are_flattened() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"content":[{"type":"text","text":"{\"a\":"},{"type":"text","text":"1}"}]}}]}"#,
            )
            .create_async()
            .await;

        let reply = backend(&server.url(), false)
            .chat(&payload(), &ChatParameters::default())
            .await
            .unwrap();
        assert_eq!(reply.role_content, r#"{"a":1}"#);
        assert_eq!(reply.usage, Usage::default());
    }

    #[tokio::test]
    async fn test_non_success_status_is_dispatch_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = backend(&server.url(), false)
            .chat(&payload(), &ChatParameters::default())
            .await
            .unwrap_err();
        match err {
            BackendError::Dispatch {
                backend,
                status,
                message,
            } => {
                assert_eq!(backend, "main");
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected dispatch error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_choices_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = backend(&server.url(), false)
            .chat(&payload(), &ChatParameters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse { .. }));
    }

    #[test]
    fn test_request_parameters_override_descriptor() {
        let backend = backend("http://localhost", false);
        let body = backend.request_body(
            &payload(),
            &ChatParameters {
                temperature: Some(0.2),
                max_tokens: Some(64),
            },
        );
        assert_eq!(body["max_tokens"], 64);
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(body.get("response_format").is_none());
    }
}
