//! Mock backend for testing
//!
//! Provides configurable responses without a running model server. Every call
//! is counted and the last prompt is kept, so tests can check what would have
//! been sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{Error, Result};

use super::AIBackend;

const DEFAULT_REPLY: &str = "- Set aside a fixed share of income as soon as it arrives.\n\
- Review recurring expenses and cancel one you rarely use.\n\
- Track small daily purchases for a week to spot easy savings.";

#[derive(Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
}

/// Mock AI backend for testing
///
/// Clones share counters, so a test can keep one handle while the pipeline
/// owns another.
#[derive(Clone)]
pub struct MockBackend {
    behavior: Behavior,
    /// Whether health_check should return true
    pub healthy: bool,
    delay: Option<Duration>,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned advice)
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Reply(DEFAULT_REPLY.to_string()),
            healthy: true,
            delay: None,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
            last_prompt: Arc::new(Mutex::new(None)),
        }
    }

    /// Reply with `text` on every call
    pub fn with_reply(mut self, text: &str) -> Self {
        self.behavior = Behavior::Reply(text.to_string());
        self
    }

    /// Fail every call with a service error carrying `cause`
    pub fn failing(mut self, cause: &str) -> Self {
        self.behavior = Behavior::Fail(cause.to_string());
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold every call until `gate` is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Number of generate calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        if let Some(ref gate) = self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.behavior {
            Behavior::Reply(ref text) => Ok(text.clone()),
            Behavior::Fail(ref cause) => Err(Error::Service(cause.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
