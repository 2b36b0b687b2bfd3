/// Database models for TaskDesk
///
/// This module contains the user and task models and their Postgres queries.
///
/// # Models
///
/// - `user`: User accounts, roles, and the public profile projection
/// - `task`: Tasks with status/priority enums and the column list shared by queries
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{NewUser, Role, User};
/// use taskdesk_shared::db::pool::{create_pool, PoolConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(PoolConfig::new(std::env::var("DATABASE_URL")?)).await?;
///
/// let user = User::create(&pool, NewUser {
///     name: "Ada Lovelace".to_string(),
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::User,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;

/// Error returned when a stored or submitted enum value is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    /// Which enum failed to parse (e.g. "status")
    pub kind: &'static str,

    /// The rejected value
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
