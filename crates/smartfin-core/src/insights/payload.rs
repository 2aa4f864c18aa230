//! Bounded, sanitized snapshot of the ledger sent to the advisory service

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Result;
use crate::models::{format_currency, FinanceSummary, Transaction, TransactionType};
use crate::prompts::{PromptId, PromptLibrary};

/// Most transactions a payload will carry
pub const MAX_RECENT_TRANSACTIONS: usize = 10;

/// What the advisory service gets to see
///
/// No ids and no timestamps: only the summary figures and the type, amount
/// and description of the most recent transactions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightPayload {
    pub summary: SummaryFigures,
    pub recent_transactions: Vec<PayloadTransaction>,
}

/// Summary figures, pre-formatted as currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryFigures {
    pub income: String,
    pub expenses: String,
    pub savings: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: f64,
    pub description: String,
}

impl InsightPayload {
    /// Build from a summary and a newest-first transaction list
    pub fn build(summary: &FinanceSummary, transactions: &[Transaction]) -> Self {
        let recent_transactions = transactions
            .iter()
            .take(MAX_RECENT_TRANSACTIONS)
            .map(|t| PayloadTransaction {
                kind: t.kind,
                amount: t.amount,
                description: t.description.clone(),
            })
            .collect();

        Self {
            summary: SummaryFigures {
                income: format_currency(summary.income),
                expenses: format_currency(summary.expenses),
                savings: format_currency(summary.savings),
            },
            recent_transactions,
        }
    }

    /// Pretty JSON, as embedded in the prompt
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render the advisory instruction for a payload
///
/// The same payload always yields the same text.
pub fn compose_prompt(prompts: &mut PromptLibrary, payload: &InsightPayload) -> Result<String> {
    let data = payload.to_json()?;
    let template = prompts.get(PromptId::FinancialInsight)?;

    let mut vars = HashMap::new();
    vars.insert("payload", data.as_str());
    Ok(template.render(&vars))
}
