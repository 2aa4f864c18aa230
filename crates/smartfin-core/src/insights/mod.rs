//! Advisory insights
//!
//! Turns a ledger snapshot into a short piece of advice from the configured
//! advisory service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use smartfin_core::insights::InsightPipeline;
//!
//! let pipeline = InsightPipeline::from_config(&config.advisor);
//! let outcome = pipeline
//!     .request_insight(&ledger.summarize(), ledger.list())
//!     .await;
//! ```

pub mod payload;
pub mod pipeline;

pub use payload::{
    compose_prompt, InsightPayload, PayloadTransaction, SummaryFigures, MAX_RECENT_TRANSACTIONS,
};
pub use pipeline::{
    InsightPipeline, InsightState, RequestOutcome, GENERIC_FAILURE_MESSAGE,
    MISSING_CREDENTIAL_MESSAGE, MISSING_HOST_MESSAGE,
};
