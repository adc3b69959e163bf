// Notifications module - budget/goal/bill alert dispatch
//
// The service takes an alert request, checks the per-key cooldown, consults
// the per-channel settings, fans out to the email and desktop channels, and
// records the outcome in a bounded history log. All three pieces of state
// (settings, cooldown map, history) persist as independent JSON blobs.
//
// Submodules:
// - settings: per-channel enable/type/priority toggles
// - cooldown: per-key last-sent map enforcing a 5-minute window
// - history: most-recent-first dispatch log, capped at 100 entries
// - channels: the email (HTTP) and desktop (native) delivery seams
// - templates: email subject/text/html rendering
// - service: the dispatch orchestrator

pub mod channels;
pub mod cooldown;
pub mod history;
pub mod service;
pub mod settings;
pub mod templates;

use serde::{Deserialize, Serialize};

/// Category tag for an alert, used both for display and per-type opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Income,
    Goal,
    Overspend,
    Bill,
    Investment,
    Budget,
    Milestone,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Income => "income",
            NotificationType::Goal => "goal",
            NotificationType::Overspend => "overspend",
            NotificationType::Bill => "bill",
            NotificationType::Investment => "investment",
            NotificationType::Budget => "budget",
            NotificationType::Milestone => "milestone",
        }
    }
}

/// Alert priority. Gates whether a channel fires and makes high-priority
/// desktop notifications stick until dismissed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Delivery mechanism used for one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Email,
    Desktop,
}

/// A single alert request. Immutable once constructed; the dispatcher
/// stores a snapshot of it in the history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_name: Option<String>,
    /// Goal completion percentage, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default)]
    pub priority: Priority,
}

impl NotificationRequest {
    pub fn new(
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            amount: None,
            category: None,
            goal_name: None,
            progress: None,
            priority: Priority::Medium,
        }
    }

    /// Dedup bucket identifier: two requests sharing a key are treated as
    /// the same kind of alert within the cooldown window, regardless of
    /// message or amount. The goal name wins over the category so that all
    /// alerts for one goal share a bucket.
    pub fn cooldown_key(&self) -> String {
        let qualifier = self
            .goal_name
            .as_deref()
            .or(self.category.as_deref())
            .unwrap_or("default");
        format!("{}_{}", self.kind.as_str(), qualifier)
    }
}
