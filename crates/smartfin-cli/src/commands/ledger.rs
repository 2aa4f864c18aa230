//! Ledger command implementations (add, delete, list, summary)

use anyhow::{Context, Result};
use smartfin_core::{format_currency, FinanceSummary, Ledger, Transaction, TransactionType};

use super::truncate;

pub fn cmd_add(
    ledger: &mut Ledger,
    kind: TransactionType,
    amount: &str,
    description: &str,
) -> Result<()> {
    let committed = ledger
        .add_from_input(description, amount, kind)
        .context("Transaction not recorded")?;

    let tx = &committed.value;
    println!(
        "✅ Recorded {} {} · {}",
        kind_label(tx.kind),
        format_currency(tx.amount),
        tx.description
    );
    println!("   ID: {}", tx.id);

    if let Some(ref e) = committed.persist_error {
        eprintln!("⚠️  Could not save the ledger: {}", e);
    }
    Ok(())
}

pub fn cmd_delete(ledger: &mut Ledger, id: &str) -> Result<()> {
    let committed = ledger.delete(id);

    match committed.value {
        Some(ref tx) => {
            println!(
                "🗑️  Deleted {} {} · {}",
                kind_label(tx.kind),
                format_currency(tx.amount),
                tx.description
            );
        }
        None => println!("No transaction with ID {}", id),
    }

    if let Some(ref e) = committed.persist_error {
        eprintln!("⚠️  Could not save the ledger: {}", e);
    }
    Ok(())
}

pub fn cmd_list(ledger: &Ledger, limit: usize) -> Result<()> {
    if ledger.is_empty() {
        println!("No transactions yet. Record one with:");
        println!("  smartfin add expense 12.50 Lunch");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in ledger.recent(limit) {
        println!("   {}", format_row(tx));
    }

    if ledger.len() > limit {
        println!();
        println!("   ... and {} more (use --limit)", ledger.len() - limit);
    }

    Ok(())
}

pub fn cmd_summary(ledger: &Ledger) -> Result<()> {
    let summary = ledger.summarize();

    println!();
    println!("💰 Summary");
    println!("   ─────────────────────────────");
    println!("   Income:   {:>14}", format_currency(summary.income));
    println!("   Expenses: {:>14}", format_currency(summary.expenses));
    println!("   Savings:  {:>14}", format_currency(summary.savings));
    println!();
    println!("📊 Income allocation");
    println!("   ─────────────────────────────");
    for line in format_allocation(&summary) {
        println!("   {}", line);
    }
    println!();
    println!("   {} transaction(s)", ledger.len());

    Ok(())
}

fn kind_label(kind: TransactionType) -> &'static str {
    match kind {
        TransactionType::Income => "income",
        TransactionType::Expense => "expense",
    }
}

/// One line of `smartfin list`
pub(crate) fn format_row(tx: &Transaction) -> String {
    let amount_str = match tx.kind {
        TransactionType::Expense => format!("\x1b[31m-{}\x1b[0m", format_currency(tx.amount)),
        TransactionType::Income => format!("\x1b[32m+{}\x1b[0m", format_currency(tx.amount)),
    };

    format!(
        "{} │ {:>14} │ {} │ {}",
        tx.date.format("%Y-%m-%d"),
        amount_str,
        truncate(&tx.description, 40),
        tx.id
    )
}

/// Lines describing how income splits between expenses and savings
pub fn format_allocation(summary: &FinanceSummary) -> Vec<String> {
    let Some(allocation) = summary.allocation() else {
        return vec!["No data to visualize yet".to_string()];
    };

    vec![
        format!(
            "Expenses: {:>14} {:>5.1}%",
            format_currency(allocation.expenses),
            allocation.expense_share() * 100.0
        ),
        format!(
            "Savings:  {:>14} {:>5.1}%",
            format_currency(allocation.savings),
            allocation.savings_share() * 100.0
        ),
    ]
}
