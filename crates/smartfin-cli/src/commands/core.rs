//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve and load smartfin.toml
//! - `resolve_data_dir` - Pick the data directory (flag beats config)
//! - `open_ledger` - Open the file-backed ledger
//! - `build_pipeline` - Create the insight pipeline from config

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use smartfin_core::{Config, InsightPipeline, JsonFileStore, Ledger, LoadStatus};
use tracing::debug;

/// Load config from an explicit path, or the default resolution
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

pub fn resolve_data_dir(config: &Config, data_dir: Option<&Path>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => config.data_dir().context("Failed to resolve data directory"),
    }
}

/// Open the ledger stored in `data_dir`
///
/// A corrupt ledger file is ignored with a warning; the next change
/// overwrites it.
pub fn open_ledger(config: &Config, data_dir: &Path) -> Result<Ledger> {
    let store = JsonFileStore::with_key(data_dir, &config.storage.ledger_key)
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    debug!(path = %store.path().display(), "Using ledger file");

    let ledger = Ledger::open(Box::new(store));
    if let LoadStatus::Discarded { reason } = ledger.load_status() {
        eprintln!("⚠️  Stored ledger could not be read and was ignored: {}", reason);
    }
    Ok(ledger)
}

pub fn build_pipeline(config: &Config) -> InsightPipeline {
    InsightPipeline::from_config(&config.advisor)
}
