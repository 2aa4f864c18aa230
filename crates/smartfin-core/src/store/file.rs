//! Local filesystem ledger store

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{decode_ledger, encode_ledger, LedgerStore, LoadStatus, StoredLedger, LEDGER_KEY};
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Stores the ledger blob as `<data_dir>/<key>.json`
pub struct JsonFileStore {
    data_dir: PathBuf,
    key: String,
}

impl JsonFileStore {
    /// Create a store under `data_dir` using the default key
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_key(data_dir, LEDGER_KEY)
    }

    /// Create a store with an explicit key
    pub fn with_key(data_dir: impl Into<PathBuf>, key: &str) -> Result<Self> {
        let data_dir = data_dir.into();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| {
                Error::Persistence(format!(
                    "Failed to create data directory {}: {}",
                    data_dir.display(),
                    e
                ))
            })?;
            info!("Created data directory: {}", data_dir.display());
        }

        Ok(Self {
            data_dir,
            key: key.to_string(),
        })
    }

    /// Default data directory (~/.local/share/smartfin on Linux)
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join("smartfin"))
    }

    /// Full path of the ledger file
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.key))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl LedgerStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn load(&self) -> StoredLedger {
        let path = self.path();
        match fs::read_to_string(&path) {
            Ok(blob) => {
                debug!("Loaded ledger from {}", path.display());
                decode_ledger(&blob)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => StoredLedger::empty(LoadStatus::Missing),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to read stored ledger");
                StoredLedger::empty(LoadStatus::Discarded {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn save(&self, transactions: &[Transaction]) -> Result<()> {
        let blob = encode_ledger(transactions)?;
        let path = self.path();

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(&self.data_dir).map_err(|e| {
            Error::Persistence(format!(
                "Failed to create temp file in {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;
        tmp.write_all(blob.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| {
            Error::Persistence(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!(count = transactions.len(), "Saved ledger to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use chrono::Utc;
    use tempfile::TempDir;

    fn tx(id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            kind: TransactionType::Income,
            description: "Salary".to_string(),
            amount: 1000.0,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let stored = store.load();
        assert!(stored.transactions.is_empty());
        assert_eq!(stored.status, LoadStatus::Missing);
    }

    #[test]
    fn test_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = JsonFileStore::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(store.path(), nested.join("smartfin_transactions_v1.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path()).unwrap();
        let txs = vec![tx("2"), tx("1")];

        store.save(&txs).unwrap();
        let stored = store.load();
        assert_eq!(stored.transactions, txs);

        // Overwritten wholesale
        store.save(&txs[..1]).unwrap();
        assert_eq!(store.load().transactions.len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::with_key(dir.path(), "ledger").unwrap();
        fs::write(store.path(), "][").unwrap();

        let stored = store.load();
        assert!(stored.transactions.is_empty());
        assert!(matches!(stored.status, LoadStatus::Discarded { .. }));
    }

    #[test]
    fn test_save_into_removed_dir_fails() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("gone");
        let store = JsonFileStore::new(&data_dir).unwrap();
        fs::remove_dir_all(&data_dir).unwrap();

        assert!(store.save(&[tx("1")]).is_err());
    }
}
