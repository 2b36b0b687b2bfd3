/// Task service
///
/// Every operation takes the caller's [`AuthContext`] and consults
/// [`authorize`] before touching the store.
///
/// # Listing
///
/// Listings return one page plus pagination metadata. `total` comes from a
/// `COUNT` over the filter and the page from a second `SELECT` over the same
/// predicates. The two statements are not run in a transaction, so a write
/// landing between them can make `total` and the page disagree by that write.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::auth::middleware::AuthContext;
/// use taskdesk_shared::models::user::Role;
/// use taskdesk_shared::notify::DisabledNotifier;
/// use taskdesk_shared::services::tasks::{CreateTaskInput, TaskQuery, TaskService};
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = TaskService::new(Arc::new(MemoryStore::new()), Arc::new(DisabledNotifier));
/// let admin = AuthContext::new(1, Role::Admin);
///
/// tasks.create(&admin, CreateTaskInput {
///     title: "Write docs".to_string(),
///     priority: Some("High".to_string()),
///     ..Default::default()
/// }).await?;
///
/// let page = tasks.get_all(&admin, &TaskQuery::default()).await?;
/// assert_eq!(page.pagination.total, 1);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError};

use super::due_date::normalize_due_date;
use super::{
    non_empty, parse_optional, parse_required, validation_details, FieldError, MessageResponse,
    ServiceError, ServiceResult,
};
use crate::auth::authorization::{authorize, TaskOperation};
use crate::auth::middleware::AuthContext;
use crate::models::task::{NewTask, Task, TaskChanges, TaskPriority, TaskStatus};
use crate::notify::message::assignment_email;
use crate::notify::Notifier;
use crate::store::filter::{TaskFilter, TaskOrder};
use crate::store::Store;

/// Default page size
pub const DEFAULT_LIMIT: i64 = 6;

/// Largest accepted page size
pub const MAX_LIMIT: i64 = 100;

const STATUS_MESSAGE: &str = "Status must be one of Open, In Progress, Done";
const PRIORITY_MESSAGE: &str = "Priority must be one of Low, Medium, High";

/// Width of `tasks.title`
pub const MAX_TITLE_LEN: usize = 255;

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if title.trim().is_empty() || len > MAX_TITLE_LEN {
        let mut err = ValidationError::new("length");
        err.message = Some("Title must be between 1 and 255 characters".into());
        return Err(err);
    }
    Ok(())
}

/// Create-task request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub assigned_to: Option<i64>,

    /// ISO-8601 date or date-time
    #[serde(default)]
    pub due_date: Option<String>,

    /// `Low`, `Medium`, or `High` (required)
    #[serde(default)]
    pub priority: Option<String>,
}

/// Admin full-edit request; every field is overwritten
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateInput {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub assigned_to: Option<i64>,

    #[serde(default)]
    pub due_date: Option<String>,
}

/// Self-service status update request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateStatusInput {
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw listing query string: `?status=&priority=&page=&limit=&userId=`
///
/// Kept as strings so empty values count as absent and bad values become
/// field errors rather than request rejections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ListTasksParams {
    /// Parses the filter and paging parameters
    pub fn query(&self) -> ServiceResult<TaskQuery> {
        let mut errors = Vec::new();

        let status = parse_optional("status", self.status.as_deref(), STATUS_MESSAGE, &mut errors);
        let priority =
            parse_optional("priority", self.priority.as_deref(), PRIORITY_MESSAGE, &mut errors);
        let page = parse_optional("page", self.page.as_deref(), "Page must be a number", &mut errors);
        let limit =
            parse_optional("limit", self.limit.as_deref(), "Limit must be a number", &mut errors);

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let query = TaskQuery {
            status,
            priority,
            page: page.unwrap_or(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT),
        };
        query.check()?;

        Ok(query)
    }

    /// Parses `userId`; absent means the caller
    pub fn user_id(&self) -> ServiceResult<Option<i64>> {
        match non_empty(self.user_id.as_deref()) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ServiceError::invalid("userId", "User id must be a number")),
        }
    }
}

/// Typed listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,

    /// 1-based page number
    pub page: i64,

    /// Page size, 1..=100
    pub limit: i64,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl TaskQuery {
    fn check(&self) -> ServiceResult<()> {
        let mut errors = Vec::new();
        if self.page < 1 {
            errors.push(FieldError::new("page", "Page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            errors.push(FieldError::new("limit", "Limit must be between 1 and 100"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }

    fn filter(&self) -> TaskFilter {
        TaskFilter::all()
            .with_status(self.status)
            .with_priority(self.priority)
    }

    fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub total_pages: i64,
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Computes `totalPages = ceil(total / limit)`
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            total_pages: (total + limit - 1) / limit,
            page,
            limit,
        }
    }
}

/// One page of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

/// What happened to the assignment email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    /// Relay accepted the email
    Sent,

    /// Nothing to send: no assignee, unknown assignee, or relay disabled
    Skipped,

    /// Sending was attempted and failed
    Failed,
}

/// Create-task response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub message: String,
    pub task: Task,
    pub notification: NotificationStatus,
}

/// Per-status counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSummary {
    pub total: i64,
    pub open: i64,
    pub in_progress: i64,
    pub done: i64,
}

/// Task service
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
    notifier: Arc<dyn Notifier>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Creates a task (admin only) and emails the assignee
    ///
    /// The email is best-effort: its outcome is reported in the response and a
    /// failure never fails the creation.
    pub async fn create(
        &self,
        auth: &AuthContext,
        input: CreateTaskInput,
    ) -> ServiceResult<CreateTaskResponse> {
        authorize(auth, TaskOperation::Create, None)?;

        let mut errors = validation_details(&input);
        let priority = parse_required("priority", input.priority.as_deref(), PRIORITY_MESSAGE, &mut errors);
        let due_date = collect(normalize_due_date(input.due_date.as_deref()), &mut errors);

        let (Some(priority), Some(due_date), true) = (priority, due_date, errors.is_empty()) else {
            return Err(ServiceError::Validation(errors));
        };

        let task = self
            .store
            .create_task(NewTask {
                title: input.title,
                description: input.description,
                assigned_to: input.assigned_to,
                due_date,
                priority,
            })
            .await?;

        info!(task_id = task.id, assigned_to = ?task.assigned_to, "Task created");

        let notification = match task.assigned_to {
            Some(user_id) => self.notify_assignee(user_id, &task).await,
            None => NotificationStatus::Skipped,
        };

        Ok(CreateTaskResponse {
            message: "Task created successfully".to_string(),
            task,
            notification,
        })
    }

    async fn notify_assignee(&self, user_id: i64, task: &Task) -> NotificationStatus {
        if !self.notifier.is_enabled() {
            return NotificationStatus::Skipped;
        }

        let assignee = match self.store.find_user_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(task_id = task.id, user_id, "Assignee not found, skipping email");
                return NotificationStatus::Skipped;
            }
            Err(e) => {
                warn!(task_id = task.id, user_id, error = %e, "Assignee lookup failed");
                return NotificationStatus::Failed;
            }
        };

        match self.notifier.send(&assignment_email(&assignee, task)).await {
            Ok(()) => {
                info!(task_id = task.id, user_id, "Assignment email sent");
                NotificationStatus::Sent
            }
            Err(e) => {
                warn!(task_id = task.id, user_id, error = %e, "Assignment email failed");
                NotificationStatus::Failed
            }
        }
    }

    /// Lists all tasks, oldest first
    pub async fn get_all(&self, auth: &AuthContext, query: &TaskQuery) -> ServiceResult<TaskPage> {
        authorize(auth, TaskOperation::ListAll, None)?;
        query.check()?;

        self.page(query.filter(), TaskOrder::IdAscending, query).await
    }

    /// Lists tasks assigned to `user_id` (default: the caller), newest first
    pub async fn get_by_user(
        &self,
        auth: &AuthContext,
        user_id: Option<i64>,
        query: &TaskQuery,
    ) -> ServiceResult<TaskPage> {
        let user_id = user_id.unwrap_or(auth.user_id);
        authorize(auth, TaskOperation::ListForUser(user_id), None)?;
        query.check()?;

        self.page(query.filter().assigned_to(user_id), TaskOrder::IdDescending, query)
            .await
    }

    async fn page(&self, filter: TaskFilter, order: TaskOrder, query: &TaskQuery) -> ServiceResult<TaskPage> {
        let total = self.store.count_tasks(&filter).await?;
        let tasks = self
            .store
            .list_tasks(&filter, order, query.limit, query.offset())
            .await?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::new(total, query.page, query.limit),
        })
    }

    /// Gets one task (admin or assignee)
    pub async fn get_by_id(&self, auth: &AuthContext, id: i64) -> ServiceResult<Task> {
        let task = self
            .store
            .find_task(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        authorize(auth, TaskOperation::View, Some(&task))?;
        Ok(task)
    }

    /// Overwrites every editable field (admin only)
    ///
    /// Succeeds even when no task has this id.
    pub async fn admin_update(
        &self,
        auth: &AuthContext,
        id: i64,
        input: AdminUpdateInput,
    ) -> ServiceResult<MessageResponse> {
        authorize(auth, TaskOperation::AdminUpdate, None)?;

        let mut errors = validation_details(&input);
        let status = parse_required("status", input.status.as_deref(), STATUS_MESSAGE, &mut errors);
        let priority = parse_required("priority", input.priority.as_deref(), PRIORITY_MESSAGE, &mut errors);
        let due_date = collect(normalize_due_date(input.due_date.as_deref()), &mut errors);

        let (Some(status), Some(priority), Some(due_date), true) =
            (status, priority, due_date, errors.is_empty())
        else {
            return Err(ServiceError::Validation(errors));
        };

        let rows = self
            .store
            .update_task(
                id,
                TaskChanges {
                    title: input.title,
                    description: input.description,
                    status,
                    priority,
                    assigned_to: input.assigned_to,
                    due_date,
                },
            )
            .await?;

        debug!(task_id = id, rows, "Task updated by admin");
        Ok(MessageResponse::new("Task updated successfully"))
    }

    /// Sets only the status (admin or assignee)
    pub async fn update_status(
        &self,
        auth: &AuthContext,
        id: i64,
        input: UpdateStatusInput,
    ) -> ServiceResult<MessageResponse> {
        let mut errors = Vec::new();
        let status = parse_required("status", input.status.as_deref(), STATUS_MESSAGE, &mut errors);
        let Some(status) = status else {
            return Err(ServiceError::Validation(errors));
        };

        let target = self.store.find_task(id).await?;
        authorize(auth, TaskOperation::UpdateStatus, target.as_ref())?;

        let rows = self.store.update_task_status(id, status).await?;

        debug!(task_id = id, rows, status = %status, "Task status updated");
        Ok(MessageResponse::new("Task updated"))
    }

    /// Deletes a task (admin only); succeeds even when nothing matched
    pub async fn delete(&self, auth: &AuthContext, id: i64) -> ServiceResult<MessageResponse> {
        authorize(auth, TaskOperation::Delete, None)?;

        let rows = self.store.delete_task(id).await?;

        info!(task_id = id, rows, "Task deleted");
        Ok(MessageResponse::new("Task deleted successfully"))
    }

    /// Counts tasks per status: all tasks for admins, own tasks for users
    pub async fn summary(&self, auth: &AuthContext) -> ServiceResult<TaskSummary> {
        authorize(auth, TaskOperation::Summary, None)?;

        let scope = if auth.is_admin() {
            TaskFilter::all()
        } else {
            TaskFilter::all().assigned_to(auth.user_id)
        };

        Ok(TaskSummary {
            total: self.store.count_tasks(&scope).await?,
            open: self.count_with_status(scope, TaskStatus::Open).await?,
            in_progress: self.count_with_status(scope, TaskStatus::InProgress).await?,
            done: self.count_with_status(scope, TaskStatus::Done).await?,
        })
    }

    async fn count_with_status(&self, scope: TaskFilter, status: TaskStatus) -> ServiceResult<i64> {
        Ok(self.store.count_tasks(&scope.with_status(Some(status))).await?)
    }
}

/// Moves a single field result into the error list
fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    result.map_err(|e| errors.push(e)).ok()
}
