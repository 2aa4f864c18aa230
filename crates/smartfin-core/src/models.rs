//! Domain models for SmartFin

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether money came in or went out
///
/// The sign of a transaction lives here, never in the stored amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry
///
/// All fields are fixed at creation; there is no editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque unique identifier (UUID v4)
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    /// Always non-negative
    pub amount: f64,
    /// Creation time, serialized as ISO-8601
    pub date: DateTime<Utc>,
}

/// Income, expenses and savings derived from a ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

impl FinanceSummary {
    /// Total over every transaction; no partitioning by date or category.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        transactions
            .iter()
            .fold(Self::default(), |summary, t| summary.with(t.kind, t.amount))
    }

    /// This summary with one more transaction counted
    pub fn with(self, kind: TransactionType, amount: f64) -> Self {
        let (income, expenses) = match kind {
            TransactionType::Income => (self.income + amount, self.expenses),
            TransactionType::Expense => (self.income, self.expenses + amount),
        };
        Self {
            income,
            expenses,
            savings: income - expenses,
        }
    }

    /// Whether all three figures are finite
    pub fn is_finite(&self) -> bool {
        self.income.is_finite() && self.expenses.is_finite() && self.savings.is_finite()
    }

    /// How income splits into expenses and savings
    ///
    /// `None` when there is nothing to show yet.
    pub fn allocation(&self) -> Option<IncomeAllocation> {
        if self.income <= 0.0 && self.expenses <= 0.0 {
            return None;
        }
        Some(IncomeAllocation {
            expenses: self.expenses,
            savings: self.savings.max(0.0),
        })
    }
}

/// Income split into spending and what is left over
///
/// Overspending shows as zero savings, so expenses take the whole split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IncomeAllocation {
    pub expenses: f64,
    /// Never negative
    pub savings: f64,
}

impl IncomeAllocation {
    /// Fraction of the split going to expenses, in `0.0..=1.0`
    pub fn expense_share(&self) -> f64 {
        self.share(self.expenses)
    }

    /// Fraction of the split kept as savings, in `0.0..=1.0`
    pub fn savings_share(&self) -> f64 {
        self.share(self.savings)
    }

    fn share(&self, part: f64) -> f64 {
        let total = self.expenses + self.savings;
        if total > 0.0 {
            part / total
        } else {
            0.0
        }
    }
}

/// Format an amount as US dollars: `$1,234.50`, `-$300.00`
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }

    let digits = format!("{:.2}", amount.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = digits.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}
