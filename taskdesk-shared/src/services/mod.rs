/// Business services consumed by the HTTP layer
///
/// # Services
///
/// - [`identity::IdentityService`]: registration, login, listing users
/// - [`tasks::TaskService`]: the task lifecycle, gated by the access policy
///
/// Services validate their inputs, consult the policy, and talk to storage
/// through [`crate::store::Store`]. They return [`ServiceError`], which the API
/// maps onto HTTP statuses.

pub mod due_date;
pub mod identity;
pub mod tasks;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::auth::authorization::AuthzError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// One invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears on the wire
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Service error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed validation
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldError>),

    /// Uniqueness conflict (duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Access policy denied the operation
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    /// Target does not exist
    #[error("{0}")]
    NotFound(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Any other failure (hashing, signing)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Single-field validation error
    pub fn invalid(field: &str, message: &str) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(field_errors(&errors))
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field)),
            })
        })
        .collect();
    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(format!("Token operation failed: {}", err))
    }
}

/// `{message}` response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Runs derive validation, returning its field errors for further collection
pub(crate) fn validation_details<T: Validate>(input: &T) -> Vec<FieldError> {
    input
        .validate()
        .err()
        .map(|e| field_errors(&e))
        .unwrap_or_default()
}

/// Treats empty and whitespace-only strings as absent
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Parses an optional field, recording a field error on failure
pub(crate) fn parse_optional<T: FromStr>(
    field: &str,
    value: Option<&str>,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = non_empty(value)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

/// Parses a required field, recording a field error when absent or invalid
pub(crate) fn parse_required<T: FromStr>(
    field: &str,
    value: Option<&str>,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    if non_empty(value).is_none() {
        errors.push(FieldError::new(field, format!("{} is required", capitalize(field))));
        return None;
    }
    parse_optional(field, value, message, errors)
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
