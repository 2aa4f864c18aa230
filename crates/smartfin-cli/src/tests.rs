//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::time::Duration;

use clap::Parser;
use smartfin_core::{
    AIClient, Config, InsightPipeline, Ledger, MemoryStore, MockBackend, PromptLibrary,
    TransactionType,
};
use tempfile::TempDir;

use crate::cli::{Cli, Commands, PromptsAction};
use crate::commands::{self, truncate};

fn mock_pipeline(mock: &MockBackend) -> InsightPipeline {
    InsightPipeline::new(Some(AIClient::from(mock.clone())), Duration::from_secs(5))
        .with_prompts(PromptLibrary::embedded_only())
}

fn seeded_ledger() -> Ledger {
    let mut ledger = Ledger::in_memory();
    ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    ledger
        .add("Rent", 300.0, TransactionType::Expense)
        .unwrap()
        .into_value();
    ledger
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_add_joins_description() {
    let cli = Cli::try_parse_from(["smartfin", "add", "expense", "12.50", "Lunch", "with", "team"])
        .unwrap();
    match cli.command {
        Commands::Add {
            kind,
            amount,
            description,
        } => {
            assert_eq!(kind, TransactionType::Expense);
            assert_eq!(amount, "12.50");
            assert_eq!(description.join(" "), "Lunch with team");
        }
        _ => panic!("expected add"),
    }
}

#[test]
fn test_parse_add_rejects_unknown_kind() {
    assert!(Cli::try_parse_from(["smartfin", "add", "gift", "10", "Socks"]).is_err());
}

#[test]
fn test_parse_add_requires_description() {
    assert!(Cli::try_parse_from(["smartfin", "add", "income", "10"]).is_err());
}

#[test]
fn test_parse_negative_amount_reaches_validation() {
    let cli = Cli::try_parse_from(["smartfin", "add", "income", "-5", "Refund"]).unwrap();
    assert!(matches!(cli.command, Commands::Add { ref amount, .. } if amount == "-5"));
}

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "smartfin",
        "list",
        "--limit",
        "5",
        "--data-dir",
        "/tmp/sf",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.data_dir.as_deref(), Some(std::path::Path::new("/tmp/sf")));
    assert!(matches!(cli.command, Commands::List { limit: 5 }));
}

#[test]
fn test_parse_prompts_show_default_id() {
    let cli = Cli::try_parse_from(["smartfin", "prompts", "show"]).unwrap();
    match cli.command {
        Commands::Prompts {
            action: PromptsAction::Show { id },
        } => assert_eq!(id, "financial_insight"),
        _ => panic!("expected prompts show"),
    }
}

// ========== Ledger Command Tests ==========

#[test]
fn test_cmd_add() {
    let mut ledger = Ledger::in_memory();
    let result = commands::cmd_add(&mut ledger, TransactionType::Income, "1000", "Salary");
    assert!(result.is_ok());
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.list()[0].amount, 1000.0);
    assert_eq!(ledger.list()[0].description, "Salary");
}

#[test]
fn test_cmd_add_invalid_amount() {
    let mut ledger = Ledger::in_memory();
    let result = commands::cmd_add(&mut ledger, TransactionType::Expense, "abc", "Lunch");
    assert!(result.is_err());
    assert!(ledger.is_empty());
}

#[test]
fn test_cmd_add_blank_description() {
    let mut ledger = Ledger::in_memory();
    let result = commands::cmd_add(&mut ledger, TransactionType::Expense, "5", "   ");
    assert!(result.is_err());
    assert!(ledger.is_empty());
}

#[test]
fn test_cmd_add_with_failing_store_still_records() {
    let store = MemoryStore::new();
    store.set_fail_writes(true);
    let mut ledger = Ledger::open(Box::new(store));

    let result = commands::cmd_add(&mut ledger, TransactionType::Expense, "5", "Coffee");
    assert!(result.is_ok());
    assert_eq!(ledger.len(), 1);
}

#[test]
fn test_cmd_delete() {
    let mut ledger = seeded_ledger();
    let id = ledger.list()[0].id.clone();

    assert!(commands::cmd_delete(&mut ledger, &id).is_ok());
    assert_eq!(ledger.len(), 1);
    assert!(ledger.get(&id).is_none());
}

#[test]
fn test_cmd_delete_unknown() {
    let mut ledger = seeded_ledger();
    assert!(commands::cmd_delete(&mut ledger, "missing").is_ok());
    assert_eq!(ledger.len(), 2);
}

#[test]
fn test_cmd_list() {
    let ledger = seeded_ledger();
    assert!(commands::cmd_list(&ledger, 20).is_ok());
    assert!(commands::cmd_list(&ledger, 1).is_ok());
    assert!(commands::cmd_list(&Ledger::in_memory(), 20).is_ok());
}

#[test]
fn test_format_row() {
    let ledger = seeded_ledger();
    let rent = commands::ledger::format_row(&ledger.list()[0]);
    assert!(rent.contains("-$300.00"));
    assert!(rent.contains("Rent"));
    assert!(rent.contains(&ledger.list()[0].id));

    let salary = commands::ledger::format_row(&ledger.list()[1]);
    assert!(salary.contains("+$1,000.00"));
}

#[test]
fn test_cmd_summary() {
    assert!(commands::cmd_summary(&seeded_ledger()).is_ok());
    assert!(commands::cmd_summary(&Ledger::in_memory()).is_ok());
}

#[test]
fn test_format_allocation() {
    let lines = commands::ledger::format_allocation(&seeded_ledger().summarize());
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("$300.00"));
    assert!(lines[0].contains("30.0%"));
    assert!(lines[1].contains("$700.00"));
    assert!(lines[1].contains("70.0%"));
}

#[test]
fn test_format_allocation_overspent() {
    let mut ledger = seeded_ledger();
    commands::cmd_add(&mut ledger, TransactionType::Expense, "1000", "Car repair").unwrap();

    let lines = commands::ledger::format_allocation(&ledger.summarize());
    assert!(lines[0].contains("$1,300.00"));
    assert!(lines[0].contains("100.0%"));
    assert!(lines[1].contains("$0.00"));
    assert!(lines[1].contains("0.0%"));
    assert!(!lines[1].contains('-'));
}

#[test]
fn test_format_allocation_empty() {
    let lines = commands::ledger::format_allocation(&Ledger::in_memory().summarize());
    assert_eq!(lines, vec!["No data to visualize yet".to_string()]);
}

// ========== Advisor Command Tests ==========

#[tokio::test]
async fn test_cmd_advise() {
    let mock = MockBackend::new();
    let pipeline = mock_pipeline(&mock);
    let ledger = seeded_ledger();

    assert!(commands::cmd_advise(&ledger, &pipeline).await.is_ok());
    assert_eq!(mock.calls(), 1);
    let prompt = mock.last_prompt().unwrap();
    assert!(prompt.contains("$1,000.00"));
    assert!(prompt.contains("$700.00"));
}

#[tokio::test]
async fn test_cmd_advise_service_failure() {
    let mock = MockBackend::new().failing("503 Service Unavailable");
    let pipeline = mock_pipeline(&mock);

    let err = commands::cmd_advise(&seeded_ledger(), &pipeline)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to generate insight. Please try again later."
    );
}

#[tokio::test]
async fn test_cmd_advise_without_credential() {
    let pipeline = InsightPipeline::new(None, Duration::from_secs(5));

    let err = commands::cmd_advise(&seeded_ledger(), &pipeline)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "API Key is missing. Cannot generate insights."
    );
}

// ========== Status and Setup Tests ==========

#[tokio::test]
async fn test_cmd_status() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();
    let ledger = seeded_ledger();

    let configured = mock_pipeline(&MockBackend::new());
    assert!(
        commands::cmd_status(&config, dir.path(), &ledger, &configured)
            .await
            .is_ok()
    );

    let unconfigured = InsightPipeline::new(None, Duration::from_secs(5));
    assert!(
        commands::cmd_status(&config, dir.path(), &ledger, &unconfigured)
            .await
            .is_ok()
    );
}

#[test]
fn test_open_ledger_persists_between_runs() {
    let dir = TempDir::new().unwrap();
    let config = Config::default();

    {
        let mut ledger = commands::open_ledger(&config, dir.path()).unwrap();
        commands::cmd_add(&mut ledger, TransactionType::Income, "250", "Bonus").unwrap();
    }

    let ledger = commands::open_ledger(&config, dir.path()).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.list()[0].description, "Bonus");
    assert!(dir.path().join("smartfin_transactions_v1.json").exists());
}

#[test]
fn test_load_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("smartfin.toml");
    std::fs::write(
        &path,
        "[storage]\nledger_key = \"custom\"\n\n[advisor]\nbackend = \"mock\"\ntimeout_secs = 5\n",
    )
    .unwrap();

    let config = commands::load_config(Some(&path)).unwrap();
    assert_eq!(config.storage.ledger_key, "custom");
    assert_eq!(config.advisor.timeout, Duration::from_secs(5));

    let ledger_dir = dir.path().join("data");
    let mut ledger = commands::open_ledger(&config, &ledger_dir).unwrap();
    commands::cmd_add(&mut ledger, TransactionType::Expense, "3", "Tea").unwrap();
    assert!(ledger_dir.join("custom.json").exists());
}

#[test]
fn test_load_config_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = commands::load_config(Some(&dir.path().join("nope.toml")));
    assert!(result.is_err());
}

#[test]
fn test_resolve_data_dir_flag_wins() {
    let dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.storage.data_dir = Some(dir.path().join("from-config"));

    let flagged = commands::resolve_data_dir(&config, Some(dir.path())).unwrap();
    assert_eq!(flagged, dir.path());

    let configured = commands::resolve_data_dir(&config, None).unwrap();
    assert_eq!(configured, dir.path().join("from-config"));
}

// ========== Prompts Command Tests ==========

#[test]
fn test_cmd_prompts_show() {
    assert!(commands::cmd_prompts_show("financial_insight").is_ok());
    assert!(commands::cmd_prompts_show("no_such_prompt").is_err());
}

#[test]
fn test_cmd_prompts_path() {
    assert!(commands::cmd_prompts_path().is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is a long description", 10), "this is...");
    assert_eq!(truncate("café crème brûlée", 8), "café ...");
}
