/// In-memory store
///
/// Holds users and tasks behind a `tokio::sync::RwLock`. Mirrors the Postgres
/// schema's behavior:
///
/// - ids are assigned from a monotonic counter starting at 1
/// - emails are unique (exact match on the canonical form)
/// - new tasks start `Open`
/// - mutations of missing ids affect zero rows and succeed
///
/// # Example
///
/// ```
/// use taskdesk_shared::models::task::{NewTask, TaskPriority, TaskStatus};
/// use taskdesk_shared::store::{memory::MemoryStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let task = store.create_task(NewTask {
///     title: "Try the memory store".to_string(),
///     description: None,
///     assigned_to: None,
///     due_date: None,
///     priority: TaskPriority::Low,
/// }).await?;
///
/// assert_eq!(task.id, 1);
/// assert_eq!(task.status, TaskStatus::Open);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::filter::{TaskFilter, TaskOrder};
use super::{Store, StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{NewTask, Task, TaskChanges, TaskStatus};
use crate::models::user::{NewUser, Role, User};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    next_user_id: i64,
    next_task_id: i64,
}

impl Tables {
    fn task_mut(&mut self, id: i64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}

/// In-memory implementation of [`Store`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::Conflict {
                constraint: "users_email_key".to_string(),
            });
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        // Insertion order is id order
        Ok(tables.users.iter().filter(|u| u.role == role).cloned().collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, data: NewTask) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;

        tables.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.next_task_id,
            title: data.title,
            description: data.description,
            assigned_to: data.assigned_to,
            due_date: data.due_date,
            priority: data.priority,
            status: TaskStatus::Open,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: i64) -> StoreResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn count_tasks(&self, filter: &TaskFilter) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.iter().filter(|t| filter.matches(t)).count() as i64)
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        order: TaskOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;

        let mut matching: Vec<Task> = tables
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        order.sort(&mut matching);

        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let Some(task) = tables.task_mut(id) else {
            return Ok(0);
        };
        task.title = changes.title;
        task.description = changes.description;
        task.status = changes.status;
        task.priority = changes.priority;
        task.assigned_to = changes.assigned_to;
        task.due_date = changes.due_date;
        task.updated_at = Utc::now();

        Ok(1)
    }

    async fn update_task_status(&self, id: i64, status: TaskStatus) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let Some(task) = tables.task_mut(id) else {
            return Ok(0);
        };
        task.status = status;
        task.updated_at = Utc::now();

        Ok(1)
    }

    async fn delete_task(&self, id: i64) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;

        let before = tables.tasks.len();
        tables.tasks.retain(|t| t.id != id);

        Ok((before - tables.tasks.len()) as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskPriority;

    fn new_user(email: &str, role: Role) -> NewUser {
        NewUser {
            name: "Someone".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role,
        }
    }

    fn new_task(title: &str, priority: TaskPriority, assigned_to: Option<i64>) -> NewTask {
        NewTask {
            title: title.to_string(),
            description: None,
            assigned_to,
            due_date: None,
            priority,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@b.com", Role::User)).await.unwrap();

        let err = store.create_user(new_user("a@b.com", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.list_users_by_role(Role::User).await.unwrap().len(), 1);
        assert!(store.list_users_by_role(Role::Admin).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let store = MemoryStore::new();
        let created = store.create_user(new_user("x@y.org", Role::User)).await.unwrap();

        assert_eq!(created.id, 1);
        let by_email = store.find_user_by_email("x@y.org").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert!(store.find_user_by_id(created.id).await.unwrap().is_some());
        assert!(store.find_user_by_id(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_task_ids_are_monotonic_and_start_open() {
        let store = MemoryStore::new();
        let first = store.create_task(new_task("one", TaskPriority::Low, None)).await.unwrap();
        let second = store.create_task(new_task("two", TaskPriority::Low, None)).await.unwrap();

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(second.status, TaskStatus::Open);
    }

    #[tokio::test]
    async fn test_list_pages_in_order() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .create_task(new_task(&format!("t{i}"), TaskPriority::High, Some(1)))
                .await
                .unwrap();
        }

        let filter = TaskFilter::all();
        let asc = store.list_tasks(&filter, TaskOrder::IdAscending, 2, 2).await.unwrap();
        assert_eq!(asc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);

        let desc = store.list_tasks(&filter, TaskOrder::IdDescending, 2, 0).await.unwrap();
        assert_eq!(desc.iter().map(|t| t.id).collect::<Vec<_>>(), vec![5, 4]);

        let past_end = store.list_tasks(&filter, TaskOrder::IdAscending, 6, 30).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_of_missing_ids_affect_zero_rows() {
        let store = MemoryStore::new();

        assert_eq!(store.delete_task(42).await.unwrap(), 0);
        assert_eq!(store.update_task_status(42, TaskStatus::Done).await.unwrap(), 0);

        let task = store.create_task(new_task("real", TaskPriority::Medium, None)).await.unwrap();
        assert_eq!(store.update_task_status(task.id, TaskStatus::Done).await.unwrap(), 1);
        assert_eq!(store.find_task(task.id).await.unwrap().unwrap().status, TaskStatus::Done);
        assert_eq!(store.delete_task(task.id).await.unwrap(), 1);
        assert!(store.find_task(task.id).await.unwrap().is_none());
    }
}
