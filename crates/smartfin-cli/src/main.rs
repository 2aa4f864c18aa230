//! SmartFin CLI - Personal finance tracker
//!
//! Usage:
//!   smartfin add expense 42.10 Groceries   Record a transaction
//!   smartfin list                          Show recent transactions
//!   smartfin summary                       Income, expenses and savings
//!   smartfin advise                        Ask for spending advice

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    // Prompt commands don't touch the ledger or config
    if let Commands::Prompts { action } = &cli.command {
        return match action {
            PromptsAction::Show { id } => commands::cmd_prompts_show(id),
            PromptsAction::Path => commands::cmd_prompts_path(),
        };
    }

    let config = commands::load_config(cli.config.as_deref())?;
    let data_dir = commands::resolve_data_dir(&config, cli.data_dir.as_deref())?;
    let mut ledger = commands::open_ledger(&config, &data_dir)?;

    match cli.command {
        Commands::Add {
            kind,
            amount,
            description,
        } => commands::cmd_add(&mut ledger, kind, &amount, &description.join(" ")),
        Commands::Delete { id } => commands::cmd_delete(&mut ledger, &id),
        Commands::List { limit } => commands::cmd_list(&ledger, limit),
        Commands::Summary => commands::cmd_summary(&ledger),
        Commands::Advise => {
            let pipeline = commands::build_pipeline(&config);
            commands::cmd_advise(&ledger, &pipeline).await
        }
        Commands::Status => {
            let pipeline = commands::build_pipeline(&config);
            commands::cmd_status(&config, &data_dir, &ledger, &pipeline).await
        }
        Commands::Prompts { .. } => Ok(()),
    }
}
