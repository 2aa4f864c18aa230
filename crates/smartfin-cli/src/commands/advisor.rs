//! Insight command implementation

use anyhow::{bail, Result};
use smartfin_core::{InsightPipeline, InsightState, Ledger, RequestOutcome};

pub async fn cmd_advise(ledger: &Ledger, pipeline: &InsightPipeline) -> Result<()> {
    if let Some(model) = pipeline.model() {
        println!("🤖 Asking {} for advice...", model);
    }

    let outcome = pipeline
        .request_insight(&ledger.summarize(), ledger.list())
        .await;

    match outcome {
        RequestOutcome::Completed(InsightState::Resolved(text)) => {
            println!();
            println!("💡 Financial Insight");
            println!("   ─────────────────────────────────────────────────────────────");
            for line in text.lines() {
                println!("   {}", line);
            }
            println!();
            Ok(())
        }
        RequestOutcome::Completed(InsightState::Failed(message)) => bail!(message),
        RequestOutcome::Completed(state) => bail!("Unexpected insight state: {:?}", state),
        RequestOutcome::Ignored => {
            println!("An insight request is already in progress.");
            Ok(())
        }
    }
}
