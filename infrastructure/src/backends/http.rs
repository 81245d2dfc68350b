//! Request plumbing shared by the HTTP backends.

use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::{trace, warn};
use turnstile_application::BackendError;

/// Send `request` and decode the JSON body.
///
/// Non-2xx responses become [`BackendError::Dispatch`] carrying the body
/// text; connection failures become [`BackendError::Transport`].
pub(crate) async fn send_json(backend: &str, request: RequestBuilder) -> Result<Value, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::Transport {
            backend: backend.to_string(),
            message: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response.text().await.unwrap_or_default();
        warn!(status = %status, backend = %backend, body = %body_text, "backend API error");
        return Err(BackendError::Dispatch {
            backend: backend.to_string(),
            status: status.as_u16(),
            message: body_text,
        });
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|e| BackendError::InvalidResponse {
            backend: backend.to_string(),
            message: e.to_string(),
        })?;
    trace!(backend = %backend, response = %body, "raw backend response");
    Ok(body)
}

pub(crate) fn invalid(backend: &str, message: impl Into<String>) -> BackendError {
    BackendError::InvalidResponse {
        backend: backend.to_string(),
        message: message.into(),
    }
}

/// Token count at `value[field]`, zero when absent.
pub(crate) fn count(value: &Value, field: &str) -> u64 {
    value[field].as_u64().unwrap_or(0)
}
