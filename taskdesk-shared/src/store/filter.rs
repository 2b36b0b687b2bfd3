/// Typed task filter
///
/// A filter is a list of optional equality predicates, AND-combined. The same
/// predicate list drives two distinct parameterized statements (a `COUNT` and a
/// page `SELECT`) for Postgres, and [`TaskFilter::matches`] for the in-memory store.
///
/// # Example
///
/// ```
/// use taskdesk_shared::models::task::{TaskPriority, TaskStatus};
/// use taskdesk_shared::store::filter::{TaskFilter, TaskOrder};
///
/// let filter = TaskFilter::default()
///     .with_status(Some(TaskStatus::Done))
///     .with_priority(Some(TaskPriority::High));
///
/// assert_eq!(
///     filter.count_query().sql(),
///     "SELECT COUNT(*) FROM tasks WHERE status = $1 AND priority = $2"
/// );
/// ```

use sqlx::{Postgres, QueryBuilder};

use crate::models::task::{Task, TaskPriority, TaskStatus, TASK_COLUMNS};

/// Optional equality predicates over the task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<i64>,
}

/// Page ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    /// Oldest first (admin listing)
    IdAscending,

    /// Newest first (per-user listing)
    IdDescending,
}

impl TaskOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            TaskOrder::IdAscending => " ORDER BY id ASC",
            TaskOrder::IdDescending => " ORDER BY id DESC",
        }
    }

    /// Sorts tasks in place by this ordering
    pub fn sort(&self, tasks: &mut [Task]) {
        match self {
            TaskOrder::IdAscending => tasks.sort_by_key(|t| t.id),
            TaskOrder::IdDescending => tasks.sort_by_key(|t| std::cmp::Reverse(t.id)),
        }
    }
}

/// One equality predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Predicate {
    Status(TaskStatus),
    Priority(TaskPriority),
    AssignedTo(i64),
}

impl Predicate {
    fn column(&self) -> &'static str {
        match self {
            Predicate::Status(_) => "status",
            Predicate::Priority(_) => "priority",
            Predicate::AssignedTo(_) => "assigned_to",
        }
    }

    fn matches(&self, task: &Task) -> bool {
        match *self {
            Predicate::Status(status) => task.status == status,
            Predicate::Priority(priority) => task.priority == priority,
            Predicate::AssignedTo(user_id) => task.assigned_to == Some(user_id),
        }
    }

    fn push(&self, query: &mut QueryBuilder<'static, Postgres>) {
        query.push(self.column()).push(" = ");
        match *self {
            Predicate::Status(status) => query.push_bind(status.as_str()),
            Predicate::Priority(priority) => query.push_bind(priority.as_str()),
            Predicate::AssignedTo(user_id) => query.push_bind(user_id),
        };
    }
}

impl TaskFilter {
    /// Filter that matches every task
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Option<TaskPriority>) -> Self {
        self.priority = priority;
        self
    }

    /// Restricts the filter to one assignee
    pub fn assigned_to(mut self, user_id: i64) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(3);
        if let Some(status) = self.status {
            predicates.push(Predicate::Status(status));
        }
        if let Some(priority) = self.priority {
            predicates.push(Predicate::Priority(priority));
        }
        if let Some(user_id) = self.assigned_to {
            predicates.push(Predicate::AssignedTo(user_id));
        }
        predicates
    }

    /// Whether a task satisfies every predicate
    pub fn matches(&self, task: &Task) -> bool {
        self.predicates().iter().all(|p| p.matches(task))
    }

    fn push_where(&self, query: &mut QueryBuilder<'static, Postgres>) {
        for (i, predicate) in self.predicates().iter().enumerate() {
            query.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push(query);
        }
    }

    /// Builds `SELECT COUNT(*)` over the predicates
    pub fn count_query(&self) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new("SELECT COUNT(*) FROM tasks");
        self.push_where(&mut query);
        query
    }

    /// Builds the page `SELECT` over the same predicates
    pub fn page_query(&self, order: TaskOrder, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks"));
        self.push_where(&mut query);
        query.push(order.as_sql());
        query.push(" LIMIT ").push_bind(limit);
        query.push(" OFFSET ").push_bind(offset);
        query
    }
}
