// Plan state - the persisted financial plan the watcher evaluates
//
// Mirrors what the dashboard keeps in durable storage: monthly income, the
// income split percentages, recurring bills, savings goals, category
// budgets and the transaction ledger. Loaded parse-or-default like every
// other state blob.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Income split percentages. Should sum to 100 but nothing enforces it;
/// the metrics only ever scale by the individual buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IncomeSplit {
    pub needs: f64,
    pub wants: f64,
    pub savings: f64,
    pub investments: f64,
}

impl Default for IncomeSplit {
    fn default() -> Self {
        // The 50/30/15/5 split the dashboard starts from.
        Self {
            needs: 50.0,
            wants: 30.0,
            savings: 15.0,
            investments: 5.0,
        }
    }
}

/// A recurring bill or fixed expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub name: String,
    pub category: String,
    pub amount: f64,
    /// Day of month the bill is due, 1-31. None for bills without a date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
}

/// A savings goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub name: String,
    pub target: f64,
    #[serde(default)]
    pub saved: f64,
}

impl Goal {
    /// Completion percentage, clamped to 0-100.
    pub fn progress_percent(&self) -> u8 {
        if self.target <= 0.0 {
            return 0;
        }
        ((self.saved / self.target) * 100.0).clamp(0.0, 100.0) as u8
    }
}

/// A monthly spending limit for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
}

/// One ledger entry. Income is positive, spending is negative (displayed
/// as an absolute value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The whole persisted plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default)]
    pub split: IncomeSplit,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl PlanState {
    pub fn load(path: &Path) -> Self {
        crate::storage::load_or_default(path)
    }

    /// Month-to-date spending (absolute value) in one category.
    pub fn spent_this_month(&self, category: &str, today: NaiveDate) -> f64 {
        self.transactions
            .iter()
            .filter(|tx| {
                tx.amount < 0.0
                    && tx.date.year() == today.year()
                    && tx.date.month() == today.month()
                    && tx.category.as_deref() == Some(category)
            })
            .map(|tx| -tx.amount)
            .sum()
    }
}
