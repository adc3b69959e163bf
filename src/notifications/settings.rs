// Notification settings - per-channel enable/type/priority toggles
//
// One record per channel (email, desktop). Everything defaults to enabled
// so a fresh install alerts on all types and priorities. Loads are
// parse-or-default and every mutation persists immediately.

use crate::notifications::{NotificationRequest, NotificationType, Priority};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn enabled() -> bool {
    true
}

/// Per-type opt-in flags for one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeToggles {
    #[serde(default = "enabled")]
    pub income: bool,
    #[serde(default = "enabled")]
    pub goal: bool,
    #[serde(default = "enabled")]
    pub overspend: bool,
    #[serde(default = "enabled")]
    pub bill: bool,
    #[serde(default = "enabled")]
    pub investment: bool,
    #[serde(default = "enabled")]
    pub budget: bool,
    #[serde(default = "enabled")]
    pub milestone: bool,
}

impl Default for TypeToggles {
    fn default() -> Self {
        Self {
            income: true,
            goal: true,
            overspend: true,
            bill: true,
            investment: true,
            budget: true,
            milestone: true,
        }
    }
}

impl TypeToggles {
    pub fn allows(&self, kind: NotificationType) -> bool {
        match kind {
            NotificationType::Income => self.income,
            NotificationType::Goal => self.goal,
            NotificationType::Overspend => self.overspend,
            NotificationType::Bill => self.bill,
            NotificationType::Investment => self.investment,
            NotificationType::Budget => self.budget,
            NotificationType::Milestone => self.milestone,
        }
    }
}

/// Per-priority opt-in flags for one channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityToggles {
    #[serde(default = "enabled")]
    pub low: bool,
    #[serde(default = "enabled")]
    pub medium: bool,
    #[serde(default = "enabled")]
    pub high: bool,
}

impl Default for PriorityToggles {
    fn default() -> Self {
        Self {
            low: true,
            medium: true,
            high: true,
        }
    }
}

impl PriorityToggles {
    pub fn allows(&self, priority: Priority) -> bool {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }
}

/// Settings for one delivery channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSettings {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub types: TypeToggles,
    #[serde(default)]
    pub priority: PriorityToggles,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            types: TypeToggles::default(),
            priority: PriorityToggles::default(),
        }
    }
}

impl ChannelSettings {
    /// A request fires on this channel only when the channel is enabled and
    /// both its type and priority are opted in.
    pub fn eligible(&self, request: &NotificationRequest) -> bool {
        self.enabled && self.types.allows(request.kind) && self.priority.allows(request.priority)
    }
}

/// The full settings blob: one channel record each for email and desktop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default)]
    pub email: ChannelSettings,
    #[serde(default)]
    pub desktop: ChannelSettings,
}

/// Channel-level partial update. A supplied channel record replaces that
/// channel whole; callers wanting to flip a single nested toggle read the
/// current record, modify it, and send it back complete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub email: Option<ChannelSettings>,
    pub desktop: Option<ChannelSettings>,
}

/// Owns the in-memory settings and their persisted blob.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: NotificationSettings,
}

impl SettingsStore {
    /// Load persisted settings, falling back to all-enabled defaults on a
    /// missing or malformed blob.
    pub fn load(path: PathBuf) -> Self {
        let current = storage::load_or_default(&path);
        Self { path, current }
    }

    /// Current in-memory snapshot.
    pub fn get(&self) -> &NotificationSettings {
        &self.current
    }

    /// Apply a channel-level merge and persist immediately.
    pub fn update(&mut self, update: SettingsUpdate) {
        if let Some(email) = update.email {
            self.current.email = email;
        }
        if let Some(desktop) = update.desktop {
            self.current.desktop = desktop;
        }
        self.persist();
    }

    /// Sync the desktop channel to the platform permission answer obtained
    /// at service construction.
    pub(crate) fn set_desktop_enabled(&mut self, enabled: bool) {
        if self.current.desktop.enabled != enabled {
            self.current.desktop.enabled = enabled;
            self.persist();
        }
    }

    // Persistence is best-effort: settings mutations must not fail the
    // caller, so write errors are only logged.
    fn persist(&self) {
        if let Err(e) = storage::save(&self.path, &self.current) {
            tracing::warn!("Failed to persist notification settings: {:?}", e);
        }
    }
}
