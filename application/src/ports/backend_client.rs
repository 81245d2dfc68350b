//! Backend client port
//!
//! Defines the interface for sending one chat request to one LLM backend.
//! Request shaping (headers, body fields, auth) is internal to each adapter.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use turnstile_domain::{BackendDescriptor, BackendKind, ChatParameters, PromptPayload, RawReply};

/// Errors that can occur while dispatching to a backend
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No backend available in the pool")]
    NoBackendAvailable,

    #[error("Backend `{backend}` returned {status}: {message}")]
    Dispatch {
        backend: String,
        status: u16,
        message: String,
    },

    #[error("Transport error from `{backend}`: {message}")]
    Transport { backend: String, message: String },

    #[error("Backend `{backend}` timed out after {elapsed:?}")]
    Timeout { backend: String, elapsed: Duration },

    #[error("Invalid response from `{backend}`: {message}")]
    InvalidResponse { backend: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Name of the backend that failed, when one was selected.
    pub fn backend(&self) -> Option<&str> {
        match self {
            BackendError::Dispatch { backend, .. }
            | BackendError::Transport { backend, .. }
            | BackendError::Timeout { backend, .. }
            | BackendError::InvalidResponse { backend, .. } => Some(backend),
            BackendError::NoBackendAvailable | BackendError::Configuration(_) => None,
        }
    }
}

/// One LLM backend.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    fn kind(&self) -> BackendKind;

    /// Send one chat request and reshape the reply into the common envelope.
    async fn chat(
        &self,
        payload: &PromptPayload,
        parameters: &ChatParameters,
    ) -> Result<RawReply, BackendError>;
}

/// Builds clients from descriptors when the pool is (re)configured.
pub trait BackendFactory: Send + Sync {
    fn build(&self, descriptor: &BackendDescriptor) -> Result<Arc<dyn BackendClient>, BackendError>;
}
