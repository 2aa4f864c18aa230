//! Ledger persistence
//!
//! The whole ledger is one JSON blob stored under one logical key. It is read
//! once at startup and overwritten wholesale after every mutation.
//!
//! Loading fails soft: a missing blob, an unreadable blob or an unparsable
//! blob all produce an empty ledger. The reason is reported through
//! [`LoadStatus`] so a front end can decide whether to warn the user.
//!
//! # Implementations
//!
//! - [`JsonFileStore`]: one file per key, written atomically
//! - [`MemoryStore`]: in-process blob, used by tests and ephemeral sessions

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use std::collections::HashSet;

use tracing::warn;

use crate::error::Result;
use crate::models::{FinanceSummary, Transaction};

/// Default key the ledger blob is stored under
pub const LEDGER_KEY: &str = "smartfin_transactions_v1";

/// Durable storage for the transaction list
///
/// Single writer, last write wins. No transactional guarantees.
pub trait LedgerStore: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &str;

    /// Load the stored ledger, never failing
    fn load(&self) -> StoredLedger;

    /// Replace the stored ledger with `transactions`
    fn save(&self, transactions: &[Transaction]) -> Result<()>;
}

/// Result of a fail-soft load
#[derive(Debug, Clone, PartialEq)]
pub struct StoredLedger {
    /// Transactions, newest first
    pub transactions: Vec<Transaction>,
    pub status: LoadStatus,
}

impl StoredLedger {
    fn empty(status: LoadStatus) -> Self {
        Self {
            transactions: Vec::new(),
            status,
        }
    }
}

/// Why a load produced what it did
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    /// Nothing stored yet
    Missing,
    /// Blob parsed; `dropped` invalid records were skipped
    Loaded { dropped: usize },
    /// Blob could not be read or parsed and was ignored
    Discarded { reason: String },
}

/// Serialize a ledger into its stored form
pub(crate) fn encode_ledger(transactions: &[Transaction]) -> Result<String> {
    Ok(serde_json::to_string(transactions)?)
}

/// Parse a stored blob, dropping records that break ledger invariants
pub(crate) fn decode_ledger(blob: &str) -> StoredLedger {
    let parsed: Vec<Transaction> = match serde_json::from_str(blob) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "Stored ledger is unparsable, starting with an empty ledger");
            return StoredLedger::empty(LoadStatus::Discarded {
                reason: e.to_string(),
            });
        }
    };

    let total = parsed.len();
    let mut seen = HashSet::with_capacity(total);
    let mut totals = FinanceSummary::default();
    let transactions: Vec<Transaction> = parsed
        .into_iter()
        .filter(|t| {
            let counted = totals.with(t.kind, t.amount);
            let valid = t.amount.is_finite()
                && t.amount >= 0.0
                && !t.description.trim().is_empty()
                && counted.is_finite()
                && seen.insert(t.id.clone());
            if valid {
                totals = counted;
            } else {
                warn!(id = %t.id, "Dropping invalid stored transaction");
            }
            valid
        })
        .collect();

    StoredLedger {
        status: LoadStatus::Loaded {
            dropped: total - transactions.len(),
        },
        transactions,
    }
}
