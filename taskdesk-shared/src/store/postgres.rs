/// Postgres-backed store
///
/// Thin adapter from the storage traits onto the model queries in
/// [`crate::models`]. Unique violations surface as [`super::StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::filter::{TaskFilter, TaskOrder};
use super::{Store, StoreResult, TaskStore, UserStore};
use crate::db::pool::health_check;
use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{NewUser, Role, User};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        Ok(User::list_by_role(&self.pool, role).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data).await?)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<i64> {
        Ok(Task::count(&self.pool, filter).await?)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        order: TaskOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Task>> {
        Ok(Task::list(&self.pool, filter, order, limit, offset).await?)
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<u64> {
        Ok(Task::update(&self.pool, id, changes).await?)
    }

    async fn update_task_status(&self, id: i64, status: TaskStatus) -> StoreResult<u64> {
        Ok(Task::update_status(&self.pool, id, status).await?)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<u64> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
