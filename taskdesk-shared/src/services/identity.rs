/// Identity service
///
/// Registration, login, and the admin's user directory.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::services::identity::{IdentityConfig, IdentityService, LoginInput, RegisterInput};
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let identity = IdentityService::new(
///     Arc::new(MemoryStore::new()),
///     IdentityConfig::new("a-secret-that-is-at-least-32-bytes!"),
/// );
///
/// identity.register(RegisterInput {
///     name: "Ada Lovelace".to_string(),
///     email: "Ada@Example.com".to_string(),
///     password: "secret1".to_string(),
///     role: None,
/// }).await?;
///
/// let session = identity.login(LoginInput {
///     email: "ada@example.com".to_string(),
///     password: "secret1".to_string(),
/// }).await?;
/// assert_eq!(session.user.email, "ada@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};
use validator::{Validate, ValidationError};

use super::{non_empty, validation_details, FieldError, ServiceError, ServiceResult};
use crate::auth::authorization::require_role;
use crate::auth::jwt::{create_token, Claims};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{hash_password, verify_password};
use crate::models::user::{NewUser, PublicUser, Role};
use crate::store::{Store, StoreError};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("email regex is valid")
});

/// Width of `users.email`
pub const MAX_EMAIL_LEN: usize = 255;

/// Trims and lower-cases an email address
pub fn canonical_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email_pattern(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("Email is required".into());
        return Err(err);
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        let mut err = ValidationError::new("length");
        err.message = Some(format!("Email must be at most {MAX_EMAIL_LEN} characters").into());
        return Err(err);
    }
    if !EMAIL_PATTERN.is_match(email) {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        return Err(err);
    }
    Ok(())
}

/// Registration request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterInput {
    #[serde(default)]
    #[validate(length(min = 3, max = 50, message = "Name must be between 3 and 50 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(custom(function = "validate_email_pattern"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    /// `admin`, `user`, or absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginInput {
    #[serde(default)]
    #[validate(custom(function = "validate_email_pattern"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Login response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Identity service settings
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// HS256 signing secret
    pub jwt_secret: String,

    /// Token validity window
    pub token_ttl: Duration,

    /// When false, an `admin` role claim at registration becomes `user`
    pub allow_admin_registration: bool,
}

impl IdentityConfig {
    /// Settings with a one-day token lifetime and admin registration allowed
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Claims::default_ttl(),
            allow_admin_registration: true,
        }
    }
}

/// Identity service
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    config: IdentityConfig,
}

impl IdentityService {
    pub fn new(store: Arc<dyn Store>, config: IdentityConfig) -> Self {
        Self { store, config }
    }

    /// Registers a new account
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for schema violations (nothing is stored)
    /// - `ServiceError::Conflict` when the canonical email is taken
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<RegisterResponse> {
        let input = RegisterInput {
            email: canonical_email(&input.email),
            ..input
        };

        let mut errors = validation_details(&input);

        let requested_role = match non_empty(input.role.as_deref()) {
            None => Some(Role::User),
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.push(FieldError::new("role", "Role must be admin or user"));
                    None
                }
            },
        };

        let role = match requested_role {
            Some(role) if errors.is_empty() => role,
            _ => return Err(ServiceError::Validation(errors)),
        };

        let role = if role.is_admin() && !self.config.allow_admin_registration {
            debug!(email = %input.email, "Admin registration disabled, registering as user");
            Role::User
        } else {
            role
        };

        if self.store.find_user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let user = self
            .store
            .create_user(NewUser {
                name: input.name,
                email: input.email,
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                // Lost the race against a concurrent registration
                StoreError::Conflict { .. } => {
                    ServiceError::Conflict("Email already exists".to_string())
                }
                other => ServiceError::Store(other),
            })?;

        info!(user_id = user.id, role = %user.role, "User registered");

        Ok(RegisterResponse {
            message: "User registered successfully".to_string(),
            user: PublicUser::from(user),
        })
    }

    /// Exchanges credentials for a bearer token
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> ServiceResult<LoginResponse> {
        let input = LoginInput {
            email: canonical_email(&input.email),
            ..input
        };
        input.validate()?;

        let Some(user) = self.store.find_user_by_email(&input.email).await? else {
            debug!("Login for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(&input.password, &user.password_hash)? {
            debug!(user_id = user.id, "Login with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let claims = Claims::new(user.id, user.role, self.config.token_ttl);
        let token = create_token(&claims, &self.config.jwt_secret)?;

        info!(user_id = user.id, "User logged in");

        Ok(LoginResponse {
            token,
            user: PublicUser::from(user),
        })
    }

    /// Lists all non-admin users, ordered by id (admin only)
    pub async fn list_users(&self, auth: &AuthContext) -> ServiceResult<Vec<PublicUser>> {
        require_role(auth, Role::Admin)?;

        let users = self.store.list_users_by_role(Role::User).await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_email() {
        assert_eq!(canonical_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_email_pattern() {
        assert!(validate_email_pattern("ada@example.com").is_ok());
        assert!(validate_email_pattern("first.last+tag@sub.example.io").is_ok());
        assert!(validate_email_pattern("Ada@example.com").is_ok());

        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "ada@example.c", "ada@Example.com"] {
            assert!(validate_email_pattern(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_register_input_lengths() {
        let input = RegisterInput {
            name: "Al".to_string(),
            email: "al@example.com".to_string(),
            password: "12345".to_string(),
            role: None,
        };

        let ServiceError::Validation(details) = ServiceError::from(input.validate().unwrap_err()) else {
            panic!("expected validation error");
        };
        let fields: Vec<&str> = details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "password"]);
    }

    #[test]
    fn test_name_length_counts_characters() {
        let input = RegisterInput {
            name: "Zoë".to_string(),
            email: "zoe@example.com".to_string(),
            password: "secret".to_string(),
            role: None,
        };
        assert!(input.validate().is_ok());
    }
}
