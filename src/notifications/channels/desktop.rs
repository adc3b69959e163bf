// Desktop channel - native OS notifications via notify-rust
//
// High-priority alerts stay on screen until dismissed; everything else
// times out after five seconds. The "permission" probe maps to asking the
// desktop notification server for its capabilities where the platform
// supports that query.

use super::DesktopNotifier;
use crate::notifications::{NotificationRequest, Priority};
use anyhow::{anyhow, Result};

#[derive(Debug, Default)]
pub struct NativeNotifier;

impl NativeNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl DesktopNotifier for NativeNotifier {
    #[cfg(all(unix, not(target_os = "macos")))]
    fn request_permission(&self) -> Option<bool> {
        // A reachable notification server that answers the capabilities
        // call counts as granted; an unreachable one as denied.
        Some(notify_rust::get_capabilities().is_ok())
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn request_permission(&self) -> Option<bool> {
        // No queryable permission model on this platform; leave the
        // persisted setting untouched.
        None
    }

    fn show(&self, request: &NotificationRequest) -> Result<()> {
        let timeout = match request.priority {
            Priority::High => notify_rust::Timeout::Never,
            _ => notify_rust::Timeout::Milliseconds(5000),
        };

        notify_rust::Notification::new()
            .summary(&request.title)
            .body(&request.message)
            .appname("Finpulse")
            .timeout(timeout)
            .show()
            .map(|_| ())
            .map_err(|e| anyhow!("Desktop notification failed: {}", e))
    }
}
