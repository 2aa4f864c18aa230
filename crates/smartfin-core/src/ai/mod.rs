//! Pluggable advisory service backends
//!
//! The advisory service is a text-in/text-out call: a model identifier and a
//! prompt go out, plain text comes back.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all backends
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! The backend comes from `[advisor]` in smartfin.toml. Environment variables:
//! - `AI_BACKEND`: Overrides the configured backend (gemini, openai_compatible, mock)
//! - `GEMINI_API_KEY` (or the configured `api_key_env`, or `API_KEY`): credential
//!
//! A missing credential yields no client at all, which the insight pipeline
//! reports as a configuration error without making a call.

mod gemini;
mod mock;
mod openai_compatible;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::config::{AdvisorConfig, BackendKind};
use crate::error::Result;

/// Trait defining the interface for all advisory backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send one prompt and return the raw text reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable and the credential accepted
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini generateContent API
    Gemini(GeminiBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from advisor configuration
    ///
    /// `AI_BACKEND` takes priority over the configured backend.
    /// Returns None if the credential (Gemini) or host (OpenAI-compatible)
    /// is not available.
    pub fn from_config(config: &AdvisorConfig) -> Option<Self> {
        match Self::selected_backend(config) {
            BackendKind::Gemini => {
                let api_key = config.api_key()?;
                let host = config.host.as_deref().unwrap_or(gemini::DEFAULT_HOST);
                Some(AIClient::Gemini(GeminiBackend::new(
                    host,
                    &config.model,
                    &api_key,
                )))
            }
            BackendKind::OpenAICompatible => {
                let host = config
                    .host
                    .clone()
                    .or_else(|| std::env::var("OPENAI_COMPATIBLE_HOST").ok())?;
                let mut backend = OpenAICompatibleBackend::new(&host, &config.model);
                if let Some(api_key) = config.api_key() {
                    backend = backend.with_api_key(&api_key);
                }
                Some(AIClient::OpenAICompatible(backend))
            }
            BackendKind::Mock => Some(AIClient::Mock(MockBackend::new())),
        }
    }

    /// Backend to use: `AI_BACKEND` if set, otherwise the configured one
    pub fn selected_backend(config: &AdvisorConfig) -> BackendKind {
        std::env::var("AI_BACKEND")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .map(|b| BackendKind::parse_lenient(&b))
            .unwrap_or(config.backend)
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Which kind of backend this is
    pub fn kind(&self) -> BackendKind {
        match self {
            AIClient::Gemini(_) => BackendKind::Gemini,
            AIClient::OpenAICompatible(_) => BackendKind::OpenAICompatible,
            AIClient::Mock(_) => BackendKind::Mock,
        }
    }
}

impl From<MockBackend> for AIClient {
    fn from(backend: MockBackend) -> Self {
        AIClient::Mock(backend)
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.generate(prompt).await,
            AIClient::OpenAICompatible(b) => b.generate(prompt).await,
            AIClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
