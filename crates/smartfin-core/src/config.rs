//! Configuration for storage and the advisory service
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/smartfin/config/smartfin.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::store::{JsonFileStore, LEDGER_KEY};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/smartfin.toml");

/// Which advisory service implementation to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Google Gemini generateContent API
    Gemini,
    /// Any server implementing `/v1/chat/completions`
    OpenAICompatible,
    /// Canned responses, no network
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }

    /// Parse a backend name, falling back to Gemini for unknown names
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "gemini" | "google" => Self::Gemini,
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Self::OpenAICompatible
            }
            "mock" => Self::Mock,
            other => {
                tracing::warn!(backend = %other, "Unknown advisor backend, falling back to gemini");
                Self::Gemini
            }
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where and under which key the ledger is stored
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Data directory; `None` means the platform default
    pub data_dir: Option<PathBuf>,
    pub ledger_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            ledger_key: LEDGER_KEY.to_string(),
        }
    }
}

/// Advisory service settings
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub backend: BackendKind,
    /// Model identifier sent with every request
    pub model: String,
    /// Upper bound on one request
    pub timeout: Duration,
    /// Environment variable holding the credential
    pub api_key_env: String,
    /// Service base URL; `None` uses the backend default
    pub host: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Gemini,
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(30),
            api_key_env: "GEMINI_API_KEY".to_string(),
            host: None,
        }
    }
}

impl AdvisorConfig {
    /// Look up the service credential
    ///
    /// Checks the configured variable first, then the generic `API_KEY`.
    /// Blank values count as missing.
    pub fn api_key(&self) -> Option<String> {
        [self.api_key_env.as_str(), "API_KEY"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub advisor: AdvisorConfig,
}

impl Config {
    /// Load from the default override location, or embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => parse_config(DEFAULT_CONFIG),
        }
    }

    /// Load from an explicit file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        parse_config(&content)
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.storage
            .data_dir
            .clone()
            .or_else(JsonFileStore::default_data_dir)
            .ok_or_else(|| Error::Configuration("Could not determine a data directory".into()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("smartfin").join("config").join("smartfin.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    storage: Option<RawStorage>,
    advisor: Option<RawAdvisor>,
}

#[derive(Debug, Deserialize)]
struct RawStorage {
    data_dir: Option<PathBuf>,
    ledger_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawAdvisor {
    backend: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
    api_key_env: Option<String>,
    host: Option<String>,
}

/// Parse config from TOML content, layered over the defaults
fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Configuration(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(storage) = raw.storage {
        if let Some(dir) = storage.data_dir {
            config.storage.data_dir = Some(dir);
        }
        if let Some(key) = storage.ledger_key {
            if key.trim().is_empty() {
                return Err(Error::Configuration("ledger_key must not be empty".into()));
            }
            if key.contains(['/', '\\']) || key.contains("..") {
                return Err(Error::Configuration(format!(
                    "ledger_key must be a plain file name, got {:?}",
                    key
                )));
            }
            config.storage.ledger_key = key;
        }
    }

    if let Some(advisor) = raw.advisor {
        if let Some(backend) = advisor.backend {
            config.advisor.backend = BackendKind::parse_lenient(&backend);
        }
        if let Some(model) = advisor.model {
            config.advisor.model = model;
        }
        if let Some(timeout) = advisor.timeout_secs {
            if timeout == 0 {
                return Err(Error::Configuration("timeout_secs must be positive".into()));
            }
            config.advisor.timeout = Duration::from_secs(timeout);
        }
        if let Some(env) = advisor.api_key_env {
            config.advisor.api_key_env = env;
        }
        if let Some(host) = advisor.host {
            config.advisor.host = Some(host);
        }
    }

    Ok(config)
}
