//! Insight request lifecycle
//!
//! ```text
//! Idle ──trigger──▶ Pending ──resolve──▶ Resolved ──clear──▶ Idle
//!                      │
//!                      └────reject────▶ Failed ──trigger──▶ Pending
//! ```
//!
//! The state lives in a `watch` channel. Every transition is a guarded
//! check-and-set under the channel's lock, so at most one request is ever in
//! flight no matter how many tasks trigger at once.

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::ai::{AIBackend, AIClient};
use crate::config::{AdvisorConfig, BackendKind};
use crate::error::{Error, Result};
use crate::models::{FinanceSummary, Transaction};
use crate::prompts::PromptLibrary;

use super::payload::{compose_prompt, InsightPayload};

/// Shown when no service credential is configured
pub const MISSING_CREDENTIAL_MESSAGE: &str = "API Key is missing. Cannot generate insights.";

/// Shown when an OpenAI-compatible backend is selected without a host
pub const MISSING_HOST_MESSAGE: &str = "Advisor host is missing. Cannot generate insights.";

/// Shown for every transport or service failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate insight. Please try again later.";

/// Where the insight request currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InsightState {
    #[default]
    Idle,
    Pending,
    /// Trimmed advice text
    Resolved(String),
    /// User-facing message
    Failed(String),
}

impl InsightState {
    /// Whether a new request may start from this state
    pub fn can_trigger(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn insight(&self) -> Option<&str> {
        match self {
            Self::Resolved(text) => Some(text),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What a call to [`InsightPipeline::request_insight`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Another request was pending (or an insight is still shown); nothing happened
    Ignored,
    /// The request ran to completion and left the pipeline in this state
    Completed(InsightState),
}

/// Drives one advisory request at a time
pub struct InsightPipeline {
    client: Option<AIClient>,
    /// Failure shown when `client` is `None`
    unconfigured_message: &'static str,
    timeout: Duration,
    prompts: Mutex<PromptLibrary>,
    state: watch::Sender<InsightState>,
}

impl InsightPipeline {
    /// Create a pipeline; `None` means no credential is configured
    pub fn new(client: Option<AIClient>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(InsightState::Idle);
        Self {
            client,
            unconfigured_message: MISSING_CREDENTIAL_MESSAGE,
            timeout,
            prompts: Mutex::new(PromptLibrary::new()),
            state,
        }
    }

    /// Create from advisor configuration and the environment
    pub fn from_config(config: &AdvisorConfig) -> Self {
        let mut pipeline = Self::new(AIClient::from_config(config), config.timeout);
        if AIClient::selected_backend(config) == BackendKind::OpenAICompatible {
            pipeline.unconfigured_message = MISSING_HOST_MESSAGE;
        }
        pipeline
    }

    /// Use a specific prompt library
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Mutex::new(prompts);
        self
    }

    /// Current state
    pub fn state(&self) -> InsightState {
        self.state.borrow().clone()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<InsightState> {
        self.state.subscribe()
    }

    /// Whether a service credential is available
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Option<&AIClient> {
        self.client.as_ref()
    }

    /// Model identifier of the configured backend
    pub fn model(&self) -> Option<&str> {
        self.client.as_ref().map(|c| c.model())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the advisory service for an insight on this ledger snapshot
    ///
    /// Ignored while a request is pending or an insight is shown. Without a
    /// credential the pipeline fails immediately and makes no call. Service
    /// errors are logged and replaced by a generic message.
    pub async fn request_insight(
        &self,
        summary: &FinanceSummary,
        transactions: &[Transaction],
    ) -> RequestOutcome {
        let Some(client) = self.client.as_ref() else {
            let failed = InsightState::Failed(self.unconfigured_message.to_string());
            if !self.transition_from_triggerable(failed.clone()) {
                return RequestOutcome::Ignored;
            }
            warn!(
                reason = self.unconfigured_message,
                "Insight requested but the advisory backend is not configured"
            );
            return RequestOutcome::Completed(failed);
        };

        if !self.transition_from_triggerable(InsightState::Pending) {
            debug!(state = ?self.state(), "Insight request ignored");
            return RequestOutcome::Ignored;
        }

        let mut in_flight = InFlight::new(&self.state);

        let outcome = match self.fetch(client, summary, transactions).await {
            Ok(text) => InsightState::Resolved(text),
            Err(e) => {
                error!(error = %e, model = client.model(), "Insight request failed");
                InsightState::Failed(GENERIC_FAILURE_MESSAGE.to_string())
            }
        };

        in_flight.finish(outcome.clone());
        RequestOutcome::Completed(outcome)
    }

    /// Dismiss a shown insight; no-op in any other state
    ///
    /// Returns whether anything changed.
    pub fn clear(&self) -> bool {
        self.state.send_if_modified(|state| {
            if matches!(state, InsightState::Resolved(_)) {
                *state = InsightState::Idle;
                true
            } else {
                false
            }
        })
    }

    fn transition_from_triggerable(&self, next: InsightState) -> bool {
        self.state.send_if_modified(|state| {
            if state.can_trigger() {
                *state = next;
                true
            } else {
                false
            }
        })
    }

    async fn fetch(
        &self,
        client: &AIClient,
        summary: &FinanceSummary,
        transactions: &[Transaction],
    ) -> Result<String> {
        let payload = InsightPayload::build(summary, transactions);
        let prompt = {
            let mut prompts = self
                .prompts
                .lock()
                .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
            compose_prompt(&mut prompts, &payload)?
        };
        debug!(
            transactions = payload.recent_transactions.len(),
            model = client.model(),
            "Sending insight request"
        );

        let reply = tokio::time::timeout(self.timeout, client.generate(&prompt))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        let text = reply.trim();
        if text.is_empty() {
            return Err(Error::Service("empty reply".into()));
        }
        Ok(text.to_string())
    }
}

/// Moves the pipeline out of `Pending` even if the request future is dropped
struct InFlight<'a> {
    state: &'a watch::Sender<InsightState>,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn new(state: &'a watch::Sender<InsightState>) -> Self {
        Self { state, done: false }
    }

    fn finish(&mut self, outcome: InsightState) {
        self.state.send_replace(outcome);
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!("Insight request dropped before completion");
            self.state
                .send_replace(InsightState::Failed(GENERIC_FAILURE_MESSAGE.to_string()));
        }
    }
}
