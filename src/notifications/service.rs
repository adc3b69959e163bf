// Notification service - the dispatch orchestrator
//
// Single public entry point: `send`. One dispatch attempt walks the
// pipeline cooldown gate -> per-channel eligibility -> joined channel
// attempts -> history + cooldown bookkeeping. The call never fails: every
// channel error is caught and logged here, because alerts are advisory and
// must not break whatever triggered them.
//
// The service is explicitly constructed and passed around - no global
// instance - so tests run independent services against isolated state
// directories.

use crate::notifications::channels::{DesktopNotifier, EmailTransport};
use crate::notifications::cooldown::CooldownTracker;
use crate::notifications::history::{HistoryEntry, HistoryLog};
use crate::notifications::settings::{NotificationSettings, SettingsStore, SettingsUpdate};
use crate::notifications::templates::render_email;
use crate::notifications::{ChannelKind, NotificationRequest};
use crate::storage::StateFiles;
use chrono::Utc;

/// What one `send` call did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Dropped by the cooldown gate: no history entry, no channel contact.
    Suppressed,
    /// Recorded in history. `sent` is true iff at least one channel
    /// attempted delivery.
    Recorded {
        sent: bool,
        channels: Vec<ChannelKind>,
    },
}

pub struct NotificationService<E, D> {
    settings: SettingsStore,
    cooldown: CooldownTracker,
    history: HistoryLog,
    email: E,
    desktop: D,
    email_to: String,
}

impl<E: EmailTransport, D: DesktopNotifier> NotificationService<E, D> {
    /// Load persisted state and sync the desktop channel to the platform
    /// permission answer, when the platform can give one.
    pub fn new(files: &StateFiles, email: E, desktop: D, email_to: impl Into<String>) -> Self {
        let mut settings = SettingsStore::load(files.settings());
        if let Some(granted) = desktop.request_permission() {
            settings.set_desktop_enabled(granted);
        }

        Self {
            settings,
            cooldown: CooldownTracker::load(files.cooldown()),
            history: HistoryLog::load(files.history()),
            email,
            desktop,
            email_to: email_to.into(),
        }
    }

    /// Dispatch one alert. Never fails; channel errors are swallowed.
    pub async fn send(&mut self, request: NotificationRequest) -> DispatchOutcome {
        let now_ms = Utc::now().timestamp_millis();
        self.send_at(request, now_ms).await
    }

    async fn send_at(&mut self, request: NotificationRequest, now_ms: i64) -> DispatchOutcome {
        if !self.cooldown.can_send(&request, now_ms) {
            tracing::debug!(
                key = %request.cooldown_key(),
                "Alert suppressed by cooldown"
            );
            return DispatchOutcome::Suppressed;
        }

        let settings = self.settings.get();
        let email_eligible = settings.email.eligible(&request);
        let desktop_eligible = settings.desktop.eligible(&request);

        // The two channels run as independent joined operations so the
        // email round-trip never delays the desktop alert.
        let email_attempt = async {
            if !email_eligible {
                return false;
            }
            let content = render_email(&request);
            match self.email.send(&self.email_to, &content).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Email channel failed: {:?}", e);
                    false
                }
            }
        };
        let desktop_attempt = async {
            if !desktop_eligible {
                return false;
            }
            match self.desktop.show(&request) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Desktop channel failed: {:?}", e);
                    false
                }
            }
        };
        let (email_ok, desktop_ok) = tokio::join!(email_attempt, desktop_attempt);

        let mut channels = Vec::new();
        if email_ok {
            channels.push(ChannelKind::Email);
        }
        if desktop_ok {
            channels.push(ChannelKind::Desktop);
        }

        let sent = !channels.is_empty();
        self.history
            .append(HistoryEntry::record(request.clone(), sent, channels.clone(), now_ms));

        if sent {
            // Only a delivery extends the cooldown; an all-ineligible
            // attempt stays re-eligible.
            self.cooldown.mark_sent(&request, now_ms);
            tracing::info!(
                key = %request.cooldown_key(),
                channels = ?channels,
                "Alert dispatched"
            );
        } else {
            tracing::debug!(
                key = %request.cooldown_key(),
                "No eligible channel, recorded unsent"
            );
        }

        DispatchOutcome::Recorded { sent, channels }
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> &NotificationSettings {
        self.settings.get()
    }

    /// Channel-level settings merge, persisted immediately.
    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.settings.update(update);
    }

    /// Dispatch history snapshot, most recent first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.get_all()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    #[cfg(test)]
    pub(crate) fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::cooldown::COOLDOWN_MS;
    use crate::notifications::settings::ChannelSettings;
    use crate::notifications::templates::EmailContent;
    use crate::notifications::{NotificationType, Priority};
    use anyhow::bail;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockEmail {
        sent: Mutex<Vec<(String, EmailContent)>>,
        fail: bool,
    }

    impl MockEmail {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn sent_count(&self) -> usize {
            self.sent.lock().unwrap().len()
        }
    }

    impl EmailTransport for MockEmail {
        async fn send(&self, to: &str, content: &EmailContent) -> anyhow::Result<()> {
            if self.fail {
                bail!("simulated network failure");
            }
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), content.clone()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockDesktop {
        shown: Mutex<Vec<String>>,
        permission: Option<bool>,
        fail: bool,
    }

    impl MockDesktop {
        fn with_permission(granted: bool) -> Self {
            Self {
                permission: Some(granted),
                ..Default::default()
            }
        }

        fn shown_count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }
    }

    impl DesktopNotifier for MockDesktop {
        fn request_permission(&self) -> Option<bool> {
            self.permission
        }

        fn show(&self, request: &NotificationRequest) -> anyhow::Result<()> {
            if self.fail {
                bail!("simulated denied notification");
            }
            self.shown.lock().unwrap().push(request.title.clone());
            Ok(())
        }
    }

    fn state_files(dir: &tempfile::TempDir) -> StateFiles {
        StateFiles::new(dir.path().join("state")).unwrap()
    }

    fn service(
        dir: &tempfile::TempDir,
        email: MockEmail,
        desktop: MockDesktop,
    ) -> NotificationService<MockEmail, MockDesktop> {
        NotificationService::new(&state_files(dir), email, desktop, "me@example.com")
    }

    fn income_request(amount: f64) -> NotificationRequest {
        let mut req =
            NotificationRequest::new(NotificationType::Income, "Income received", "Paycheck");
        req.amount = Some(amount);
        req
    }

    fn goal_request(goal: &str, progress: u8) -> NotificationRequest {
        let mut req = NotificationRequest::new(
            NotificationType::Goal,
            "Goal progress",
            format!("{} is at {}%", goal, progress),
        );
        req.goal_name = Some(goal.to_string());
        req.progress = Some(progress);
        req
    }

    #[tokio::test]
    async fn test_income_scenario_dispatches_on_both_channels() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());

        let outcome = service.send(income_request(5000.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Email, ChannelKind::Desktop],
            }
        );

        let history = service.history();
        assert_eq!(history.len(), 1);
        assert!(history[0].sent);
        assert_eq!(history[0].request.amount, Some(5000.0));
        assert!(service.cooldown().last_sent_for("income_default").is_some());
    }

    #[tokio::test]
    async fn test_duplicate_key_within_window_is_dropped_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        let now = 1_700_000_000_000_i64;

        let first = service.send_at(goal_request("Emergency Fund", 60), now).await;
        assert!(matches!(first, DispatchOutcome::Recorded { sent: true, .. }));

        // Ten seconds later, same goal, different progress - dropped.
        let second = service
            .send_at(goal_request("Emergency Fund", 95), now + 10_000)
            .await;
        assert_eq!(second, DispatchOutcome::Suppressed);

        assert_eq!(service.history().len(), 1);
        assert_eq!(service.email.sent_count(), 1);
        assert_eq!(service.desktop.shown_count(), 1);
    }

    #[tokio::test]
    async fn test_same_key_redispatches_after_window() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        let now = 1_700_000_000_000_i64;

        service.send_at(goal_request("Vacation", 50), now).await;
        let again = service
            .send_at(goal_request("Vacation", 55), now + COOLDOWN_MS)
            .await;
        assert!(matches!(again, DispatchOutcome::Recorded { sent: true, .. }));
        assert_eq!(service.history().len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_email_leaves_desktop_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        service.update_settings(SettingsUpdate {
            email: Some(ChannelSettings {
                enabled: false,
                ..Default::default()
            }),
            desktop: None,
        });

        let outcome = service.send(income_request(100.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Desktop],
            }
        );
        assert_eq!(service.email.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_email_failure_does_not_abort_desktop() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::failing(), MockDesktop::default());

        let outcome = service.send(income_request(100.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Desktop],
            }
        );
        // Failed channel is excluded but the attempt is still a send.
        assert!(service.history()[0].sent);
    }

    #[tokio::test]
    async fn test_all_channels_failing_records_unsent_without_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let desktop = MockDesktop {
            fail: true,
            ..Default::default()
        };
        let mut service = service(&dir, MockEmail::failing(), desktop);
        let now = 1_700_000_000_000_i64;

        let outcome = service.send_at(income_request(100.0), now).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: false,
                channels: vec![],
            }
        );
        assert!(!service.history()[0].sent);
        // Cooldown untouched: the next attempt is still eligible.
        assert!(service.cooldown().last_sent_for("income_default").is_none());
        let retry = service.send_at(income_request(100.0), now + 1_000).await;
        assert!(matches!(retry, DispatchOutcome::Recorded { .. }));
    }

    #[tokio::test]
    async fn test_all_channels_ineligible_records_unsent_audit_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        let disabled = ChannelSettings {
            enabled: false,
            ..Default::default()
        };
        service.update_settings(SettingsUpdate {
            email: Some(disabled.clone()),
            desktop: Some(disabled),
        });

        let outcome = service.send(income_request(100.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: false,
                channels: vec![],
            }
        );
        assert_eq!(service.history().len(), 1);
        assert_eq!(service.email.sent_count(), 0);
        assert_eq!(service.desktop.shown_count(), 0);
    }

    #[tokio::test]
    async fn test_priority_toggle_gates_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        let mut email = service.settings().email.clone();
        email.priority.medium = false;
        service.update_settings(SettingsUpdate {
            email: Some(email),
            desktop: None,
        });

        // Medium priority request: email opted out, desktop still fires.
        let outcome = service.send(income_request(100.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Desktop],
            }
        );

        // High priority goes through both.
        let mut high = income_request(100.0);
        high.kind = NotificationType::Overspend;
        high.priority = Priority::High;
        let outcome = service.send(high).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Email, ChannelKind::Desktop],
            }
        );
    }

    #[tokio::test]
    async fn test_denied_permission_disables_desktop_channel() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::with_permission(false));

        assert!(!service.settings().desktop.enabled);
        let outcome = service.send(income_request(100.0)).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Recorded {
                sent: true,
                channels: vec![ChannelKind::Email],
            }
        );
    }

    #[tokio::test]
    async fn test_no_permission_model_keeps_loaded_setting() {
        let dir = tempfile::tempdir().unwrap();
        let files = state_files(&dir);

        // Persist a desktop-disabled settings blob first.
        {
            let mut store = SettingsStore::load(files.settings());
            store.update(SettingsUpdate {
                email: None,
                desktop: Some(ChannelSettings {
                    enabled: false,
                    ..Default::default()
                }),
            });
        }

        // permission() == None must leave the loaded value untouched.
        let service = NotificationService::new(
            &files,
            MockEmail::default(),
            MockDesktop::default(),
            "me@example.com",
        );
        assert!(!service.settings().desktop.enabled);
    }

    #[tokio::test]
    async fn test_granted_permission_reenables_desktop_channel() {
        let dir = tempfile::tempdir().unwrap();
        let files = state_files(&dir);
        {
            let mut store = SettingsStore::load(files.settings());
            store.update(SettingsUpdate {
                email: None,
                desktop: Some(ChannelSettings {
                    enabled: false,
                    ..Default::default()
                }),
            });
        }

        let service = NotificationService::new(
            &files,
            MockEmail::default(),
            MockDesktop::with_permission(true),
            "me@example.com",
        );
        assert!(service.settings().desktop.enabled);
    }

    #[tokio::test]
    async fn test_clear_history_empties_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = service(&dir, MockEmail::default(), MockDesktop::default());
        service.send(income_request(100.0)).await;
        assert_eq!(service.history().len(), 1);
        service.clear_history();
        assert!(service.history().is_empty());
    }
}
