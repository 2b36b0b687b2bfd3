/// Storage seam for users and tasks
///
/// Services talk to storage only through the [`UserStore`] and [`TaskStore`]
/// traits. Two implementations exist:
///
/// - [`postgres::PgStore`]: the production store, delegating to the model queries
/// - [`memory::MemoryStore`]: an in-process store with the same semantics
///   (unique email, default status, id ordering), used by tests and local demos
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_shared::store::{memory::MemoryStore, Store};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

pub mod filter;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{NewUser, Role, User};
use filter::{TaskFilter, TaskOrder};

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    Conflict { constraint: String },

    /// Any other backend failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Conflict {
                    constraint: db_err.constraint().unwrap_or("unique").to_string(),
                };
            }
        }
        StoreError::Database(err)
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user; fails with [`StoreError::Conflict`] if the email exists
    async fn create_user(&self, data: NewUser) -> StoreResult<User>;

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;

    /// Exact match on the canonical email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Users with the given role, ordered by id
    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>>;
}

/// Task store
///
/// Mutations return the number of rows affected. Zero is not an error.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task with status `Open`
    async fn create_task(&self, data: NewTask) -> StoreResult<Task>;

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>>;

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<i64>;

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        order: TaskOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Task>>;

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<u64>;

    async fn update_task_status(&self, id: i64, status: TaskStatus) -> StoreResult<u64>;

    async fn delete_task(&self, id: i64) -> StoreResult<u64>;
}

/// Combined store handed to the services
#[async_trait]
pub trait Store: UserStore + TaskStore {
    /// Verifies the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_conflicts() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.to_string().starts_with("Database error"));
    }
}
