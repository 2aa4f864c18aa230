//! Integration tests for smartfin-core
//!
//! These tests exercise the full record → persist → reload → advise workflow
//! against a real data directory.

use std::sync::Arc;
use std::time::Duration;

use smartfin_core::{
    insights::{GENERIC_FAILURE_MESSAGE, MAX_RECENT_TRANSACTIONS, MISSING_CREDENTIAL_MESSAGE},
    AIClient, Error, InsightPipeline, InsightState, JsonFileStore, Ledger, LedgerStore,
    LoadStatus, MemoryStore, MockBackend, PromptLibrary, RequestOutcome, TransactionType,
};
use tempfile::TempDir;
use tokio::sync::Notify;

fn file_ledger(dir: &TempDir) -> Ledger {
    let store = JsonFileStore::new(dir.path()).expect("Failed to create store");
    Ledger::open(Box::new(store))
}

fn pipeline_with(mock: &MockBackend) -> InsightPipeline {
    InsightPipeline::new(Some(AIClient::from(mock.clone())), Duration::from_secs(5))
        .with_prompts(PromptLibrary::embedded_only())
}

// =============================================================================
// Ledger Integration Tests
// =============================================================================

#[test]
fn test_salary_and_rent_scenario() {
    let dir = TempDir::new().unwrap();
    let mut ledger = file_ledger(&dir);

    ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    let rent = ledger
        .add("Rent", 300.0, TransactionType::Expense)
        .unwrap()
        .into_value();

    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger.list()[0].id, rent.id);

    let summary = ledger.summarize();
    assert_eq!(summary.income, 1000.0);
    assert_eq!(summary.expenses, 300.0);
    assert_eq!(summary.savings, 700.0);
    assert_eq!(summary.savings, summary.income - summary.expenses);
}

#[test]
fn test_ledger_survives_reopen() {
    let dir = TempDir::new().unwrap();

    let ids: Vec<String> = {
        let mut ledger = file_ledger(&dir);
        for (desc, amount, kind) in [
            ("Salary", 2500.0, TransactionType::Income),
            ("Groceries", 82.4, TransactionType::Expense),
            ("Gym", 35.0, TransactionType::Expense),
        ] {
            let committed = ledger.add(desc, amount, kind).unwrap();
            assert!(committed.is_durable());
        }
        ledger.list().iter().map(|t| t.id.clone()).collect()
    };

    let reopened = file_ledger(&dir);
    assert_eq!(reopened.load_status(), &LoadStatus::Loaded { dropped: 0 });
    let reloaded: Vec<String> = reopened.list().iter().map(|t| t.id.clone()).collect();
    assert_eq!(reloaded, ids);
    assert_eq!(reopened.list()[0].description, "Gym");
}

#[test]
fn test_save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let mut ledger = Ledger::in_memory();
    ledger
        .add("Freelance", 640.0, TransactionType::Income)
        .unwrap()
        .into_value();
    ledger
        .add("Coffee", 4.5, TransactionType::Expense)
        .unwrap()
        .into_value();

    let store = JsonFileStore::new(dir.path()).unwrap();
    store.save(ledger.list()).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.transactions, ledger.list());
}

#[test]
fn test_delete_persists_and_unknown_id_is_noop() {
    let dir = TempDir::new().unwrap();
    let mut ledger = file_ledger(&dir);
    let salary = ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    ledger
        .add("Rent", 300.0, TransactionType::Expense)
        .unwrap()
        .into_value();

    let before = ledger.list().to_vec();
    let missing = ledger.delete("no-such-id");
    assert!(missing.value.is_none());
    assert_eq!(ledger.list(), before.as_slice());

    let removed = ledger.delete(&salary.id).into_value();
    assert_eq!(removed.map(|t| t.id), Some(salary.id.clone()));

    let reopened = file_ledger(&dir);
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(&salary.id).is_none());
    assert_eq!(reopened.summarize().savings, -300.0);
}

#[test]
fn test_invalid_add_leaves_ledger_and_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut ledger = file_ledger(&dir);
    ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    let path = JsonFileStore::new(dir.path()).unwrap().path();
    let blob = std::fs::read_to_string(&path).unwrap();

    for result in [
        ledger.add("   ", 10.0, TransactionType::Expense),
        ledger.add("Refund", -5.0, TransactionType::Income),
        ledger.add_from_input("Lunch", "twelve", TransactionType::Expense),
    ] {
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    assert_eq!(ledger.len(), 1);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), blob);
}

#[test]
fn test_corrupt_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();

    let mut ledger = Ledger::open(Box::new(store));
    assert!(ledger.is_empty());
    assert!(matches!(ledger.load_status(), LoadStatus::Discarded { .. }));

    // The next mutation replaces the corrupt blob
    ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    let reopened = file_ledger(&dir);
    assert_eq!(reopened.len(), 1);
}

#[test]
fn test_failed_write_keeps_in_memory_mutation() {
    let store = MemoryStore::new();
    let mut ledger = Ledger::open(Box::new(store.clone()));
    store.set_fail_writes(true);

    let committed = ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap();
    assert!(!committed.is_durable());
    assert_eq!(ledger.len(), 1);
    assert!(store.blob().is_none());
}

// =============================================================================
// Insight Integration Tests
// =============================================================================

#[tokio::test]
async fn test_advice_from_recorded_ledger() {
    let mut ledger = Ledger::in_memory();
    for i in 0..12 {
        ledger
            .add(&format!("Purchase {i}"), 10.0 + i as f64, TransactionType::Expense)
            .unwrap()
            .into_value();
    }

    let mock = MockBackend::new().with_reply("  - Cook at home\n- Batch errands\n- Review plans  ");
    let pipeline = pipeline_with(&mock);

    let outcome = pipeline
        .request_insight(&ledger.summarize(), ledger.list())
        .await;
    assert_eq!(
        outcome,
        RequestOutcome::Completed(InsightState::Resolved(
            "- Cook at home\n- Batch errands\n- Review plans".to_string()
        ))
    );

    let prompt = mock.last_prompt().unwrap();
    assert!(prompt.contains("Purchase 11"));
    assert!(prompt.contains("Purchase 2"));
    assert!(!prompt.contains("Purchase 1\""));
    assert!(!prompt.contains("Purchase 0"));
    for t in ledger.list() {
        assert!(!prompt.contains(&t.id));
    }
    assert!(!prompt.contains("\"date\""));
    assert_eq!(
        prompt.matches("\"description\"").count(),
        MAX_RECENT_TRANSACTIONS
    );
}

#[tokio::test]
async fn test_concurrent_triggers_issue_one_call() {
    let gate = Arc::new(Notify::new());
    let mock = MockBackend::new().with_gate(gate.clone());
    let pipeline = Arc::new(pipeline_with(&mock));

    let mut ledger = Ledger::in_memory();
    ledger
        .add("Salary", 1000.0, TransactionType::Income)
        .unwrap()
        .into_value();
    let summary = ledger.summarize();
    let txs = ledger.list().to_vec();

    let mut rx = pipeline.subscribe();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            let txs = txs.clone();
            tokio::spawn(async move { pipeline.request_insight(&summary, &txs).await })
        })
        .collect();

    rx.wait_for(InsightState::is_pending).await.unwrap();
    gate.notify_one();

    let mut completed = 0;
    for handle in handles {
        if let RequestOutcome::Completed(state) = handle.await.unwrap() {
            assert!(state.insight().is_some());
            completed += 1;
        }
    }
    assert_eq!(completed, 1);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_transport_error_then_retry() {
    let failing = MockBackend::new().failing("connection refused");
    let pipeline = pipeline_with(&failing);
    let ledger = Ledger::in_memory();

    pipeline
        .request_insight(&ledger.summarize(), ledger.list())
        .await;
    assert_eq!(
        pipeline.state(),
        InsightState::Failed(GENERIC_FAILURE_MESSAGE.to_string())
    );
    assert!(!pipeline.clear());

    let retry = pipeline
        .request_insight(&ledger.summarize(), ledger.list())
        .await;
    assert!(matches!(retry, RequestOutcome::Completed(InsightState::Failed(_))));
    assert_eq!(failing.calls(), 2);
}

#[tokio::test]
async fn test_no_credential_no_call() {
    let pipeline = InsightPipeline::new(None, Duration::from_secs(5));
    let ledger = Ledger::in_memory();

    let outcome = pipeline
        .request_insight(&ledger.summarize(), ledger.list())
        .await;
    assert_eq!(
        outcome,
        RequestOutcome::Completed(InsightState::Failed(MISSING_CREDENTIAL_MESSAGE.to_string()))
    );
    assert!(pipeline.model().is_none());
}
