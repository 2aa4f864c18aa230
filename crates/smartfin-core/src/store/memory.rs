//! In-memory ledger store

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use super::{decode_ledger, encode_ledger, LedgerStore, LoadStatus, StoredLedger};
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Keeps the serialized blob in memory
///
/// Clones share the same blob, so a test can hand one clone to a ledger and
/// inspect or reopen through another.
#[derive(Clone, Default)]
pub struct MemoryStore {
    blob: Arc<RwLock<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw stored blob (may be corrupt)
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Arc::new(RwLock::new(Some(blob.into()))),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every subsequent save fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// The currently stored blob
    pub fn blob(&self) -> Option<String> {
        self.blob.read().ok().and_then(|b| b.clone())
    }
}

impl LedgerStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> StoredLedger {
        match self.blob.read() {
            Ok(guard) => match guard.as_deref() {
                Some(blob) => decode_ledger(blob),
                None => StoredLedger::empty(LoadStatus::Missing),
            },
            Err(_) => StoredLedger::empty(LoadStatus::Discarded {
                reason: "store lock poisoned".to_string(),
            }),
        }
    }

    fn save(&self, transactions: &[Transaction]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("store is not writable".into()));
        }
        let encoded = encode_ledger(transactions)?;
        let mut guard = self
            .blob
            .write()
            .map_err(|_| Error::Persistence("Failed to acquire store lock".into()))?;
        *guard = Some(encoded);
        Ok(())
    }
}
