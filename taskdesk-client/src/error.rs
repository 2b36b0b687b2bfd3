/// Client error types

use taskdesk_shared::models::user::Role;
use taskdesk_shared::services::FieldError;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Request never got a response (connect, timeout, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        /// Error code from the response body, e.g. `validation_error`
        code: String,
        message: String,
        details: Vec<FieldError>,
    },

    /// The session's role cannot perform this operation; no request was sent
    #[error("Operation requires role {required}")]
    RoleRequired { required: Role },

    /// Session file could not be read or written
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    /// Session file exists but is not a valid session
    #[error("Invalid session file: {0}")]
    InvalidSession(#[from] serde_json::Error),

    /// Base URL could not be parsed
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the bearer token (the session should be cleared)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ClientError::Api {
            status: 404,
            code: "not_found".to_string(),
            message: "Task not found".to_string(),
            details: Vec::new(),
        };

        assert_eq!(err.to_string(), "API error (404): Task not found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_role_required_has_no_status() {
        let err = ClientError::RoleRequired { required: Role::Admin };
        assert_eq!(err.to_string(), "Operation requires role admin");
        assert_eq!(err.status(), None);
    }
}
