//! Ollama native chat endpoint (`POST {base}/api/chat`), non-streaming.

use super::http::{count, invalid, send_json};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use turnstile_application::{BackendClient, BackendError};
use turnstile_domain::{
    BackendDescriptor, BackendKind, ChatParameters, PromptPayload, RawReply, Usage,
    flatten_content,
};

pub struct OllamaBackend {
    client: reqwest::Client,
    descriptor: BackendDescriptor,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, descriptor: BackendDescriptor) -> Self {
        Self { client, descriptor }
    }

    fn request_body(&self, payload: &PromptPayload, parameters: &ChatParameters) -> serde_json::Value {
        let d = &self.descriptor;
        let mut options = json!({
            "num_predict": parameters.max_tokens.unwrap_or(d.max_tokens),
        });
        if let Some(temperature) = parameters.temperature.or(d.temperature) {
            options["temperature"] = json!(temperature);
        }

        let mut body = json!({
            "model": d.model,
            "messages": payload.with_system_message(),
            "stream": false,
            "options": options,
        });
        if d.capabilities.structured_output {
            body["format"] = json!("json");
        }
        body
    }
}

#[async_trait]
impl BackendClient for OllamaBackend {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
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
            "ollama chat request"
        );

        let request = self
            .client
            .post(format!("{}/api/chat", self.descriptor.endpoint_base()))
            .json(&body);

        let resp = send_json(self.name(), request).await?;
        let message = &resp["message"];
        if message.is_null() {
            return Err(invalid(self.name(), "response has no message"));
        }

        Ok(RawReply::new(
            flatten_content(&message["content"]),
            Usage::new(count(&resp, "prompt_eval_count"), count(&resp, "eval_count")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use turnstile_domain::{BackendCapabilities, PromptMessage};

    #[tokio::test]
    async fn test_chat_reads_eval_counts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(json!({
                "model": "qwen2.5",
                "stream": false,
                "format": "json",
                "options": {"num_predict": 1024}
            })))
            .with_status(200)
            .with_body(
                r#"{"message":{"role":"assistant","content":"{\"status\":\"skip\"}"},
                    "done":true,"prompt_eval_count":30,"eval_count":5}"#,
            )
            .create_async()
            .await;

        let descriptor = BackendDescriptor::new(BackendKind::Ollama, "local", "qwen2.5")
            .with_base_url(format!("{}/", server.url()))
            .with_capabilities(BackendCapabilities {
                structured_output: true,
                vision: false,
            });
        let payload = PromptPayload {
            system: "sys".into(),
            messages: vec![PromptMessage::user("[]")],
        };
        let reply = OllamaBackend::new(reqwest::Client::new(), descriptor)
            .chat(&payload, &ChatParameters::default())
            .await
            .unwrap();

        assert_eq!(reply.role_content, r#"{"status":"skip"}"#);
        assert_eq!(reply.usage, Usage::new(30, 5));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_message_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"error":"model not loaded"}"#)
            .create_async()
            .await;

        let descriptor = BackendDescriptor::new(BackendKind::Ollama, "local", "qwen2.5")
            .with_base_url(server.url());
        let err = OllamaBackend::new(reqwest::Client::new(), descriptor)
            .chat(
                &PromptPayload {
                    system: String::new(),
                    messages: vec![],
                },
                &ChatParameters::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse { .. }));
    }
}
