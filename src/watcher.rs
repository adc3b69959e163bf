// Alert watcher - periodic re-evaluation of the financial plan
//
// A single one-minute timer reloads the plan blob and derives alert
// requests from it: income received, goal thresholds crossed, category
// overspend, budgets near their limit, bills coming due. The watcher only
// EMITS requests; duplicate suppression is entirely the notification
// service's cooldown tracker. Two distinct keys can fire back-to-back in
// one tick without coordination - everything runs on this one task.

use crate::notifications::channels::{DesktopNotifier, EmailTransport};
use crate::notifications::service::NotificationService;
use crate::notifications::{NotificationRequest, NotificationType, Priority};
use crate::plan::PlanState;
use crate::storage::StateFiles;
use chrono::{Datelike, NaiveDate, Utc};
use std::time::Duration;
use tokio::sync::oneshot;

/// Goal progress levels worth an alert, lowest first. 100 upgrades the
/// alert to a milestone.
const GOAL_THRESHOLDS: [u8; 3] = [50, 75, 90];

/// Fraction of a budget limit that triggers a near-limit warning.
const BUDGET_WARN_RATIO: f64 = 0.9;

/// How many days ahead a bill reminder fires.
const BILL_REMINDER_DAYS: i64 = 3;

/// Run the evaluation loop until shutdown is signalled.
pub async fn run<E, D>(
    mut service: NotificationService<E, D>,
    files: StateFiles,
    interval: Duration,
    mut shutdown_rx: oneshot::Receiver<()>,
) where
    E: EmailTransport,
    D: DesktopNotifier,
{
    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let plan = PlanState::load(&files.plan());
                let today = Utc::now().date_naive();
                let requests = evaluate(&plan, today);
                tracing::debug!("Watcher tick: {} candidate alert(s)", requests.len());
                for request in requests {
                    service.send(request).await;
                }
            }
            _ = &mut shutdown_rx => {
                tracing::info!("Alert watcher shutting down");
                break;
            }
        }
    }
}

/// Derive the alert requests one tick would emit for this plan. Pure, so
/// the rules are testable without a timer.
pub fn evaluate(plan: &PlanState, today: NaiveDate) -> Vec<NotificationRequest> {
    let mut requests = Vec::new();

    // Income received today.
    for tx in plan.transactions.iter().filter(|tx| tx.amount > 0.0) {
        if tx.date == today {
            let mut req = NotificationRequest::new(
                NotificationType::Income,
                "Income received",
                format!("{} added ${:.2} to your balance", tx.description, tx.amount),
            );
            req.amount = Some(tx.amount);
            requests.push(req);
        }
    }

    // Goal thresholds. 100% is a milestone, below that the highest
    // crossed threshold fires; the cooldown spaces repeats.
    for goal in &plan.goals {
        let progress = goal.progress_percent();
        if progress >= 100 {
            let mut req = NotificationRequest::new(
                NotificationType::Milestone,
                "Goal reached",
                format!("{} is fully funded - congratulations!", goal.name),
            );
            req.goal_name = Some(goal.name.clone());
            req.progress = Some(100);
            req.priority = Priority::High;
            requests.push(req);
        } else if let Some(&threshold) = GOAL_THRESHOLDS.iter().rev().find(|&&t| progress >= t) {
            let mut req = NotificationRequest::new(
                NotificationType::Goal,
                "Goal progress",
                format!("{} passed {}% ({}% saved)", goal.name, threshold, progress),
            );
            req.goal_name = Some(goal.name.clone());
            req.progress = Some(progress);
            requests.push(req);
        }
    }

    // Budgets: overspent is high priority, near-limit a medium warning.
    for budget in &plan.budgets {
        if budget.limit <= 0.0 {
            continue;
        }
        let spent = plan.spent_this_month(&budget.category, today);
        if spent > budget.limit {
            let mut req = NotificationRequest::new(
                NotificationType::Overspend,
                "Budget exceeded",
                format!(
                    "{} spending is ${:.2}, over the ${:.2} limit",
                    budget.category, spent, budget.limit
                ),
            );
            req.category = Some(budget.category.clone());
            req.amount = Some(spent);
            req.priority = Priority::High;
            requests.push(req);
        } else if spent >= budget.limit * BUDGET_WARN_RATIO {
            let mut req = NotificationRequest::new(
                NotificationType::Budget,
                "Budget almost spent",
                format!(
                    "{} is at ${:.2} of its ${:.2} limit",
                    budget.category, spent, budget.limit
                ),
            );
            req.category = Some(budget.category.clone());
            req.amount = Some(spent);
            requests.push(req);
        }
    }

    // Bills due soon.
    for bill in &plan.bills {
        let Some(due) = next_due_date(bill.due_day, today) else {
            continue;
        };
        let days_left = (due - today).num_days();
        if (0..=BILL_REMINDER_DAYS).contains(&days_left) {
            let when = match days_left {
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                n => format!("in {} days", n),
            };
            let mut req = NotificationRequest::new(
                NotificationType::Bill,
                "Bill due soon",
                format!("{} (${:.2}) is due {}", bill.name, bill.amount, when),
            );
            req.category = Some(bill.category.clone());
            req.amount = Some(bill.amount);
            requests.push(req);
        }
    }

    requests
}

/// Next occurrence of a monthly due day on or after `today`. Days that do
/// not exist in a month (the 31st in February) roll to the next month that
/// has them.
fn next_due_date(due_day: Option<u32>, today: NaiveDate) -> Option<NaiveDate> {
    let day = due_day?;
    let this_month = NaiveDate::from_ymd_opt(today.year(), today.month(), day);
    if let Some(date) = this_month {
        if date >= today {
            return Some(date);
        }
    }

    let (year, month) = if today.month() == 12 {
        (today.year() + 1, 1)
    } else {
        (today.year(), today.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
