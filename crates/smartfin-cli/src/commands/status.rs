//! Status command implementation

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use smartfin_core::{
    format_currency, AIBackend, AIClient, BackendKind, Config, InsightPipeline, Ledger, LoadStatus,
};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn cmd_status(
    config: &Config,
    data_dir: &Path,
    ledger: &Ledger,
    pipeline: &InsightPipeline,
) -> Result<()> {
    println!();
    println!("📊 SmartFin Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Data directory: {}", data_dir.display());
    println!(
        "   Ledger file: {}",
        data_dir
            .join(format!("{}.json", config.storage.ledger_key))
            .display()
    );
    match ledger.load_status() {
        LoadStatus::Missing => println!("   Ledger: (nothing saved yet)"),
        LoadStatus::Loaded { dropped: 0 } => {}
        LoadStatus::Loaded { dropped } => {
            println!("   ⚠️  Skipped {} invalid stored record(s)", dropped)
        }
        LoadStatus::Discarded { reason } => {
            println!("   ❌ Stored ledger unreadable: {}", reason)
        }
    }

    let summary = ledger.summarize();
    println!();
    println!("   Transactions: {}", ledger.len());
    println!("   Savings: {}", format_currency(summary.savings));

    println!();
    // AI_BACKEND may override the configured backend
    let backend = pipeline
        .client()
        .map(|c| c.kind())
        .unwrap_or_else(|| AIClient::selected_backend(&config.advisor));
    println!("   Advisor: {}", backend);
    println!("   Model: {}", pipeline.model().unwrap_or(config.advisor.model.as_str()));
    println!("   Timeout: {}s", config.advisor.timeout.as_secs());

    match pipeline.client() {
        None if backend == BackendKind::OpenAICompatible => {
            println!("   ❌ Host: not set (set advisor.host or OPENAI_COMPATIBLE_HOST)");
        }
        None => {
            println!(
                "   ❌ Credential: not set (export {} or API_KEY)",
                config.advisor.api_key_env
            );
        }
        Some(client) => {
            println!("   Host: {}", client.host());
            let healthy = tokio::time::timeout(HEALTH_CHECK_TIMEOUT, client.health_check())
                .await
                .unwrap_or(false);
            if healthy {
                println!("   ✅ Service: reachable");
            } else {
                println!("   ⚠️  Service: not reachable");
            }
        }
    }

    println!();
    Ok(())
}
