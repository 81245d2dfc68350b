//! Backend Pool.
//!
//! Holds an ordered list of clients and hands them out round-robin. The pool
//! never retries: a failing backend surfaces its error to the caller, which
//! decides whether to ask for the next member.

use crate::ports::backend_client::{BackendClient, BackendError, BackendFactory};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};
use turnstile_domain::{BackendDescriptor, ChatParameters, PromptPayload, RawReply};

/// The pool member chosen for one dispatch.
#[derive(Clone)]
pub struct BackendHandle {
    pub index: usize,
    pub client: Arc<dyn BackendClient>,
}

impl BackendHandle {
    pub fn name(&self) -> &str {
        self.client.name()
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("index", &self.index)
            .field("name", &self.client.name())
            .finish()
    }
}

#[derive(Default)]
pub struct BackendPool {
    clients: RwLock<Vec<Arc<dyn BackendClient>>>,
    cursor: AtomicUsize,
}

impl BackendPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clients(clients: Vec<Arc<dyn BackendClient>>) -> Self {
        Self {
            clients: RwLock::new(clients),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Build one client per enabled descriptor and replace the pool contents.
    ///
    /// Either every client builds and the pool is swapped, or the pool is left
    /// untouched. The cursor restarts at 0.
    pub fn configure(
        &self,
        descriptors: &[BackendDescriptor],
        factory: &dyn BackendFactory,
    ) -> Result<usize, BackendError> {
        let clients = descriptors
            .iter()
            .filter(|d| {
                if !d.enabled {
                    debug!(backend = %d.name, "Skipping disabled backend");
                }
                d.enabled
            })
            .map(|d| factory.build(d))
            .collect::<Result<Vec<_>, _>>()?;

        let count = clients.len();
        *self.clients.write().unwrap_or_else(PoisonError::into_inner) = clients;
        self.cursor.store(0, Ordering::SeqCst);
        info!("Backend pool configured with {} backend(s)", count);
        Ok(count)
    }

    /// Next member in round-robin order, wrapping to the first after the last.
    pub fn next(&self) -> Result<BackendHandle, BackendError> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        if clients.is_empty() {
            return Err(BackendError::NoBackendAvailable);
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % clients.len();
        Ok(BackendHandle {
            index,
            client: clients[index].clone(),
        })
    }

    /// Send one request through `handle`.
    pub async fn dispatch(
        &self,
        handle: &BackendHandle,
        payload: &PromptPayload,
        parameters: &ChatParameters,
    ) -> Result<RawReply, BackendError> {
        debug!(
            backend = handle.name(),
            index = handle.index,
            messages = payload.messages.len(),
            "Dispatching"
        );
        let started = Instant::now();
        let result = handle.client.chat(payload, parameters).await;
        match &result {
            Ok(reply) => debug!(
                backend = handle.name(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                total_tokens = reply.usage.total_tokens,
                "Dispatch complete"
            ),
            Err(e) => warn!(backend = handle.name(), "Dispatch failed: {}", e),
        }
        result
    }

    pub fn len(&self) -> usize {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> Vec<String> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }
}
