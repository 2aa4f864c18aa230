//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use smartfin_core::TransactionType;

/// SmartFin - Track income and expenses, get advice on your savings
#[derive(Parser)]
#[command(name = "smartfin")]
#[command(about = "Personal finance tracker with AI spending insights", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the ledger (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a transaction
    Add {
        /// income or expense
        kind: TransactionType,

        /// Amount, non-negative (e.g. 12.50)
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// What it was for
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction id (see `smartfin list`)
        id: String,
    },

    /// List recent transactions, newest first
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show total income, expenses and savings
    Summary,

    /// Ask the advisory service for tips based on your ledger
    Advise,

    /// Show data location, ledger size and advisor status
    Status,

    /// Manage the advisory prompt
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// Show the content of a prompt
    Show {
        /// Prompt ID
        #[arg(default_value = "financial_insight")]
        id: String,
    },
    /// Show the prompt override directory
    Path,
}
