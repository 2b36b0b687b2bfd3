/// Task model and database operations
///
/// This module provides the Task model: a unit of work an admin assigns to a user.
///
/// # Status
///
/// ```text
/// Open ⇄ In Progress ⇄ Done
/// ```
///
/// Transitions are unconstrained. Any status may be set from any other status,
/// including backward moves, and there is no terminal state.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     assigned_to BIGINT,                  -- weak reference to users(id)
///     due_date TIMESTAMP,
///     priority VARCHAR(10) NOT NULL DEFAULT 'Medium',
///     status VARCHAR(20) NOT NULL DEFAULT 'Open',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{NewTask, Task, TaskPriority, TaskStatus};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let task = Task::create(&pool, NewTask {
///     title: "Write release notes".to_string(),
///     description: None,
///     assigned_to: Some(3),
///     due_date: None,
///     priority: TaskPriority::High,
/// }).await?;
/// assert_eq!(task.status, TaskStatus::Open);
///
/// Task::update_status(&pool, task.id, TaskStatus::Done).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;

use super::ParseEnumError;
use crate::store::filter::{TaskFilter, TaskOrder};

/// Columns selected for every task query
pub(crate) const TASK_COLUMNS: &str =
    "id, title, description, assigned_to, due_date, priority, status, created_at, updated_at";

/// Task workflow status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started (store default)
    #[default]
    Open,

    /// Being worked on
    #[serde(rename = "In Progress")]
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// All statuses, in workflow order
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Done];

    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(TaskStatus::Open),
            "In Progress" => Ok(TaskStatus::InProgress),
            "Done" => Ok(TaskStatus::Done),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Converts priority to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(TaskPriority::Low),
            "Medium" => Ok(TaskPriority::Medium),
            "High" => Ok(TaskPriority::High),
            other => Err(ParseEnumError::new("priority", other)),
        }
    }
}

impl TryFrom<String> for TaskPriority {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Store-assigned task ID (monotonic, so id order is creation order)
    pub id: i64,

    /// Short title
    pub title: String,

    /// Optional free-text description
    pub description: Option<String>,

    /// Assignee user ID. Not a foreign key: may point at a user that no longer exists.
    pub assigned_to: Option<i64>,

    /// Due date, second precision, no time zone
    pub due_date: Option<NaiveDateTime>,

    #[sqlx(try_from = "String")]
    pub priority: TaskPriority,

    #[sqlx(try_from = "String")]
    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether `user_id` is this task's assignee
    pub fn is_assigned_to(&self, user_id: i64) -> bool {
        self.assigned_to == Some(user_id)
    }
}

/// Input for creating a new task
///
/// There is no status field: new tasks always start `Open`.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDateTime>,
    pub priority: TaskPriority,
}

/// Full overwrite of every editable task field
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assigned_to: Option<i64>,
    pub due_date: Option<NaiveDateTime>,
}

impl Task {
    /// Inserts a new task; status takes the column default (`Open`)
    pub async fn create(pool: &PgPool, data: NewTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (title, description, assigned_to, due_date, priority) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.assigned_to)
            .bind(data.due_date)
            .bind(data.priority.as_str())
            .fetch_one(pool)
            .await
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Counts tasks matching a filter
    pub async fn count(pool: &PgPool, filter: &TaskFilter) -> Result<i64, sqlx::Error> {
        let mut query = filter.count_query();
        query.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// Lists one page of tasks matching a filter
    pub async fn list(
        pool: &PgPool,
        filter: &TaskFilter,
        order: TaskOrder,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut query = filter.page_query(order, limit, offset);
        query.build_query_as::<Task>().fetch_all(pool).await
    }

    /// Overwrites every editable field
    ///
    /// Returns the number of rows affected; zero when the ID does not exist.
    pub async fn update(pool: &PgPool, id: i64, changes: TaskChanges) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = $4,
                priority = $5,
                assigned_to = $6,
                due_date = $7,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.status.as_str())
        .bind(changes.priority.as_str())
        .bind(changes.assigned_to)
        .bind(changes.due_date)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Overwrites only the status
    ///
    /// Returns the number of rows affected; zero when the ID does not exist.
    pub async fn update_status(pool: &PgPool, id: i64, status: TaskStatus) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a task
    ///
    /// Returns the number of rows affected; zero when the ID does not exist.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Open.as_str(), "Open");
        assert_eq!(TaskStatus::InProgress.as_str(), "In Progress");
        assert_eq!(TaskStatus::Done.as_str(), "Done");
    }

    #[test]
    fn test_task_status_parse() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("in progress".parse::<TaskStatus>().is_err());
        assert!("Closed".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_serde_matches_storage() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_task_priority_parse() {
        assert_eq!("High".parse::<TaskPriority>().unwrap(), TaskPriority::High);
        assert_eq!(TaskPriority::default(), TaskPriority::Medium);
        let err = "Urgent".parse::<TaskPriority>().unwrap_err();
        assert_eq!(err.kind, "priority");
        assert_eq!(err.value, "Urgent");
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: 1,
            title: "Ship it".to_string(),
            description: None,
            assigned_to: Some(4),
            due_date: NaiveDateTime::parse_from_str("2025-11-19 18:30:00", "%Y-%m-%d %H:%M:%S").ok(),
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["assignedTo"], 4);
        assert_eq!(json["dueDate"], "2025-11-19T18:30:00");
        assert_eq!(json["status"], "In Progress");
        assert!(task.is_assigned_to(4));
        assert!(!task.is_assigned_to(5));
    }
}
