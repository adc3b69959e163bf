// Channels module - the two delivery seams
//
// The dispatcher is generic over these traits so tests can swap in mocks
// without a network or a desktop session. Production implementations:
// - email: HTTP POST of the rendered template to the backend send endpoint
// - desktop: native OS notification

mod desktop;
mod email;

pub use desktop::NativeNotifier;
pub use email::HttpEmailTransport;

use crate::notifications::templates::EmailContent;
use crate::notifications::NotificationRequest;
use anyhow::Result;

/// Sends a rendered alert email. Failure affects only the email channel.
pub trait EmailTransport {
    fn send(
        &self,
        to: &str,
        content: &EmailContent,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Displays a native desktop notification.
pub trait DesktopNotifier {
    /// Probe the platform permission model at service construction.
    /// `Some(granted)` where the platform can answer, `None` where no
    /// queryable permission model exists.
    fn request_permission(&self) -> Option<bool>;

    /// Show the alert. High priority should keep it on screen until
    /// dismissed.
    fn show(&self, request: &NotificationRequest) -> Result<()>;
}
