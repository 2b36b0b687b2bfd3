/// Assignment notifications
///
/// When a task is created with an assignee, the task service sends the assignee
/// an email through a [`Notifier`]. Delivery is best-effort: failures are
/// reported back to the caller but never abort task creation.
///
/// # Implementations
///
/// - [`relay::HttpMailRelay`]: POSTs the email as JSON to an HTTP mail relay
/// - [`DisabledNotifier`]: used when no relay is configured; nothing is sent
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use taskdesk_shared::notify::relay::{HttpMailRelay, RelayConfig};
/// use taskdesk_shared::notify::{Email, Notifier};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let relay = HttpMailRelay::new(RelayConfig {
///     url: "http://localhost:8025/send".to_string(),
///     token: None,
///     from: "TaskDesk <no-reply@taskdesk.local>".to_string(),
///     timeout: Duration::from_secs(10),
/// })?;
///
/// relay.send(&Email {
///     to: "ada@example.com".to_string(),
///     subject: "Hello".to_string(),
///     html: "<p>Hi</p>".to_string(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod message;
pub mod relay;

use async_trait::async_trait;

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Relay client could not be built
    #[error("Invalid mail relay configuration: {0}")]
    Config(String),

    /// Request never got a response (connect error, timeout)
    #[error("Mail relay unreachable: {0}")]
    Transport(String),

    /// Relay answered with a non-success status
    #[error("Mail relay rejected message with status {status}")]
    Rejected { status: u16 },
}

/// A rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Email delivery sink
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Whether sending is configured at all
    ///
    /// The task service reports `skipped` without rendering anything when false.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Delivers one email
    async fn send(&self, email: &Email) -> Result<(), NotifyError>;
}

/// Notifier used when no mail relay is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        tracing::debug!(to = %email.to, "Mail relay disabled, dropping email");
        Ok(())
    }
}
