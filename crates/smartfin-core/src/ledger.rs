//! Ledger engine
//!
//! Owns the in-memory transaction list, which is the source of truth for the
//! running session. Every mutator validates first, mutates second and saves
//! the full list last. A failed save is reported through [`Committed`] but
//! never rolls the mutation back.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{FinanceSummary, Transaction, TransactionType};
use crate::store::{LedgerStore, LoadStatus, MemoryStore};

/// Outcome of a mutation that was applied in memory
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    /// Set when the store rejected the write
    pub persist_error: Option<Error>,
}

impl<T> Committed<T> {
    /// Whether the mutation also reached the store
    pub fn is_durable(&self) -> bool {
        self.persist_error.is_none()
    }

    /// Drop the persistence report and keep the value
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Ordered (newest first) list of transactions backed by a store
pub struct Ledger {
    transactions: Vec<Transaction>,
    store: Box<dyn LedgerStore>,
    load_status: LoadStatus,
    summary_tx: watch::Sender<FinanceSummary>,
}

impl Ledger {
    /// Open a ledger, loading whatever the store holds
    pub fn open(store: Box<dyn LedgerStore>) -> Self {
        let stored = store.load();
        debug!(
            store = store.name(),
            count = stored.transactions.len(),
            status = ?stored.status,
            "Opened ledger"
        );

        let summary = FinanceSummary::from_transactions(&stored.transactions);
        let (summary_tx, _) = watch::channel(summary);

        Self {
            transactions: stored.transactions,
            store,
            load_status: stored.status,
            summary_tx,
        }
    }

    /// Empty ledger with throwaway storage
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()))
    }

    /// How the initial load went
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Record a new transaction
    ///
    /// The description must be non-blank and the amount finite and
    /// non-negative, and the totals must stay finite once it is counted.
    /// Otherwise nothing changes and a validation error is returned.
    pub fn add(
        &mut self,
        description: &str,
        amount: f64,
        kind: TransactionType,
    ) -> Result<Committed<Transaction>> {
        let description = validate_description(description)?;
        validate_amount(amount)?;
        if !self.summarize().with(kind, amount).is_finite() {
            return Err(Error::Validation(format!(
                "Amount {} would push the ledger totals out of range",
                amount
            )));
        }

        let transaction = Transaction {
            id: self.fresh_id(),
            kind,
            description: description.to_string(),
            amount,
            date: Utc::now(),
        };

        self.transactions.insert(0, transaction.clone());
        debug!(id = %transaction.id, kind = %kind, amount, "Added transaction");

        let persist_error = self.persist();
        Ok(Committed {
            value: transaction,
            persist_error,
        })
    }

    /// Like [`Ledger::add`], but takes the amount as user-entered text
    pub fn add_from_input(
        &mut self,
        description: &str,
        amount: &str,
        kind: TransactionType,
    ) -> Result<Committed<Transaction>> {
        let amount = parse_amount(amount)?;
        self.add(description, amount, kind)
    }

    /// Remove a transaction by id
    ///
    /// Unknown ids leave the list unchanged; the removed record is returned
    /// when found. The list is saved either way.
    pub fn delete(&mut self, id: &str) -> Committed<Option<Transaction>> {
        let removed = match self.transactions.iter().position(|t| t.id == id) {
            Some(pos) => {
                debug!(id, "Deleted transaction");
                Some(self.transactions.remove(pos))
            }
            None => {
                debug!(id, "No such transaction to delete");
                None
            }
        };

        let persist_error = self.persist();
        Committed {
            value: removed,
            persist_error,
        }
    }

    /// All transactions, newest first
    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The `n` most recent transactions
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Totals over the current list
    pub fn summarize(&self) -> FinanceSummary {
        FinanceSummary::from_transactions(&self.transactions)
    }

    /// Observe the summary after every mutation
    pub fn subscribe(&self) -> watch::Receiver<FinanceSummary> {
        self.summary_tx.subscribe()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Save the full list and notify subscribers
    fn persist(&self) -> Option<Error> {
        self.summary_tx.send_replace(self.summarize());

        match self.store.save(&self.transactions) {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, store = self.store.name(), "Failed to persist ledger");
                Some(e)
            }
        }
    }
}

fn validate_description(description: &str) -> Result<&str> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Description must not be empty".into()));
    }
    Ok(trimmed)
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(Error::Validation(format!(
            "Amount must be a finite number, got {}",
            amount
        )));
    }
    if amount < 0.0 {
        return Err(Error::Validation(format!(
            "Amount must not be negative, got {}",
            amount
        )));
    }
    Ok(())
}

/// Parse a user-entered amount such as `12.50`
pub fn parse_amount(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| Error::Validation(format!("Amount is not a number: {:?}", trimmed)))?;
    validate_amount(amount)?;
    Ok(amount)
}
