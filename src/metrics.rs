// Metrics module - derived dashboard computations
//
// Pure, stateless functions over caller-supplied inputs. Nothing here
// touches persisted state; the watcher and any UI layer feed these from
// the loaded plan.

use crate::plan::{Bill, IncomeSplit, Transaction};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Monthly income minus the sum of all bill amounts.
pub fn total_balance(monthly_income: f64, bills: &[Bill]) -> f64 {
    monthly_income - bills.iter().map(|b| b.amount).sum::<f64>()
}

/// Per-category spending total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
}

/// Group bills by category and sum. Sorted descending by total (ties
/// alphabetical) - the original left the order to map insertion, which is
/// useless for a top-spending view.
pub fn top_spending(bills: &[Bill]) -> Vec<CategorySpend> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for bill in bills {
        *totals.entry(bill.category.as_str()).or_insert(0.0) += bill.amount;
    }

    let mut spending: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, total)| CategorySpend {
            category: category.to_string(),
            total,
        })
        .collect();
    spending.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    spending
}

/// One month's cash-flow row.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCashflow {
    /// Month label, `YYYY-MM`.
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub investments: f64,
    pub net: f64,
}

/// Cash-flow series over the inclusive month range [start, end].
///
/// Income and expenses come from the transactions dated in each month
/// (expenses stored negative, reported as absolute values). Savings and
/// investments are estimated from the CURRENT income and split - constant
/// across the range, not historical. Net = income - expenses - savings -
/// investments.
pub fn monthly_cashflow(
    transactions: &[Transaction],
    monthly_income: f64,
    split: &IncomeSplit,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<MonthlyCashflow> {
    let savings = monthly_income * split.savings / 100.0;
    let investments = monthly_income * split.investments / 100.0;

    let mut series = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    let (end_year, end_month) = (end.year(), end.month());

    while (year, month) <= (end_year, end_month) {
        let mut income = 0.0;
        let mut expenses = 0.0;
        for tx in transactions {
            if tx.date.year() == year && tx.date.month() == month {
                if tx.amount > 0.0 {
                    income += tx.amount;
                } else {
                    expenses += -tx.amount;
                }
            }
        }

        series.push(MonthlyCashflow {
            month: format!("{:04}-{:02}", year, month),
            income,
            expenses,
            savings,
            investments,
            net: income - expenses - savings - investments,
        });

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    series
}

/// Transaction list filters. The four extremum filters reduce to a single
/// element; ties keep the first encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionFilter {
    All,
    Highest,
    Recent,
    Lowest,
    Oldest,
}

pub fn filter_transactions(
    transactions: &[Transaction],
    filter: TransactionFilter,
) -> Vec<Transaction> {
    // Strictly-greater/-less comparisons keep the first of equal elements.
    let pick = |better: fn(&Transaction, &Transaction) -> bool| -> Vec<Transaction> {
        transactions
            .iter()
            .fold(None::<&Transaction>, |best, tx| match best {
                Some(b) if !better(tx, b) => Some(b),
                _ => Some(tx),
            })
            .map(|tx| vec![tx.clone()])
            .unwrap_or_default()
    };

    match filter {
        TransactionFilter::All => transactions.to_vec(),
        TransactionFilter::Highest => pick(|a, b| a.amount > b.amount),
        TransactionFilter::Lowest => pick(|a, b| a.amount < b.amount),
        TransactionFilter::Recent => pick(|a, b| a.date > b.date),
        TransactionFilter::Oldest => pick(|a, b| a.date < b.date),
    }
}
