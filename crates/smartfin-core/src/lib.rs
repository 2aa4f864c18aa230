//! SmartFin Core Library
//!
//! Shared functionality for the SmartFin personal finance tracker:
//! - Transaction ledger with derived income/expense/savings summary
//! - Pluggable ledger persistence (JSON file, in-memory)
//! - Insight pipeline that asks an advisory service for spending advice
//! - Pluggable advisory backends (Gemini, OpenAI-compatible, mock)
//! - Prompt library for customizable advisory prompts
//! - Layered configuration (embedded defaults plus smartfin.toml)

pub mod ai;
pub mod config;
pub mod error;
pub mod insights;
pub mod ledger;
pub mod models;
pub mod prompts;
pub mod store;

/// Test utilities including mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, GeminiBackend, MockBackend, OpenAICompatibleBackend};
pub use config::{AdvisorConfig, BackendKind, Config, StorageConfig};
pub use error::{Error, Result};
pub use insights::{InsightPayload, InsightPipeline, InsightState, RequestOutcome};
pub use ledger::{parse_amount, Committed, Ledger};
pub use models::{format_currency, FinanceSummary, IncomeAllocation, Transaction, TransactionType};
pub use prompts::{Prompt, PromptId, PromptLibrary};
pub use store::{JsonFileStore, LedgerStore, LoadStatus, MemoryStore, StoredLedger};
