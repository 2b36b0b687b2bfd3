/// HTTP mail relay client
///
/// Sends `POST <url>` with JSON body `{from, to, subject, html}` and an optional
/// `Authorization: Bearer <token>` header. Any 2xx response counts as delivered.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::{Email, Notifier, NotifyError};

/// Mail relay settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay endpoint
    pub url: String,

    /// Bearer token, if the relay requires one
    pub token: Option<String>,

    /// Sender address, e.g. `Task Management System <no-reply@taskdesk.local>`
    pub from: String,

    /// Per-request timeout
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Notifier that delivers through an HTTP mail relay
#[derive(Debug, Clone)]
pub struct HttpMailRelay {
    client: reqwest::Client,
    config: RelayConfig,
}

impl HttpMailRelay {
    /// Builds the relay client
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Config` if the HTTP client cannot be constructed
    pub fn new(config: RelayConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpMailRelay {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        let payload = RelayPayload {
            from: &self.config.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let mut request = self.client.post(&self.config.url).json(&payload);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!(to = %email.to, "Email accepted by mail relay");
        Ok(())
    }
}
