//! Scripted in-memory transport for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use pnode_shared::{TransportError, TransportErrorKind};

use crate::transport::Transport;

type Handler =
    dyn Fn(&str, &[(String, String)], usize) -> Result<Value, TransportError> + Send + Sync;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Answers every request through a handler receiving the path, the query
/// parameters and the zero-based index of the call.
#[derive(Clone)]
pub struct MockTransport {
    handler: Arc<Handler>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&str, &[(String, String)], usize) -> Result<Value, TransportError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Arc::new(handler),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Same payload for every path.
    pub fn fixed(payload: Value) -> Self {
        Self::new(move |_, _, _| Ok(payload.clone()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, TransportError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                path: path.to_string(),
                params: params.to_vec(),
            });
            calls.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        (self.handler)(path, params, index)
    }
}

pub fn status_error(code: u16) -> TransportError {
    TransportError::new(TransportErrorKind::Status(code), format!("HTTP {code}"))
}

pub fn unreachable() -> TransportError {
    TransportError::new(TransportErrorKind::Unreachable, "connection refused")
}
