/// Task endpoints
///
/// All routes require a bearer token. Who may do what is decided by the task
/// service's authorization policy, not here.
///
/// # Endpoints
///
/// - `GET /tasks` - List all tasks (`?status=&priority=&page=&limit=`)
/// - `POST /tasks` - Create a task (admin)
/// - `GET /tasks/summary` - Per-status counts
/// - `GET /tasks/user` - Tasks assigned to `?userId=` (default: caller)
/// - `GET /tasks/:id` - One task (admin or assignee)
/// - `PUT /tasks/:id` - Update status only (admin or assignee)
/// - `DELETE /tasks/:id` - Delete (admin)
/// - `PUT /tasks/admin/:id` - Overwrite every field (admin)

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
};
use axum::{extract::State, Json};
use taskdesk_shared::auth::middleware::AuthContext;
use taskdesk_shared::models::task::Task;
use taskdesk_shared::services::tasks::{
    AdminUpdateInput, CreateTaskInput, CreateTaskResponse, ListTasksParams, TaskPage,
    TaskSummary, UpdateStatusInput,
};
use taskdesk_shared::services::MessageResponse;

/// Create a task and email the assignee
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <admin token>
/// Content-Type: application/json
///
/// {
///   "title": "Prepare demo",
///   "description": "Slides and a dry run",
///   "assignedTo": 2,
///   "dueDate": "2025-11-19T18:30:00Z",
///   "priority": "High"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Task created successfully",
///   "task": { "id": 1, "title": "Prepare demo", "status": "Open", ... },
///   "notification": "sent"
/// }
/// ```
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppJson(input): AppJson<CreateTaskInput>,
) -> ApiResult<Json<CreateTaskResponse>> {
    Ok(Json(state.tasks.create(&auth, input).await?))
}

/// List all tasks, oldest first
///
/// # Response
///
/// ```json
/// {
///   "tasks": [ ... ],
///   "pagination": { "total": 8, "totalPages": 2, "page": 2, "limit": 6 }
/// }
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    AppQuery(params): AppQuery<ListTasksParams>,
) -> ApiResult<Json<TaskPage>> {
    let query = params.query()?;
    Ok(Json(state.tasks.get_all(&auth, &query).await?))
}

/// List tasks assigned to one user, newest first
pub async fn list_user_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    AppQuery(params): AppQuery<ListTasksParams>,
) -> ApiResult<Json<TaskPage>> {
    let user_id = params.user_id()?;
    let query = params.query()?;
    Ok(Json(state.tasks.get_by_user(&auth, user_id, &query).await?))
}

/// Count tasks by status
pub async fn task_summary(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<TaskSummary>> {
    Ok(Json(state.tasks.summary(&auth).await?))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tasks.get_by_id(&auth, id).await?))
}

/// Update a task's status
///
/// ```text
/// PUT /tasks/:id
/// { "status": "In Progress" }
/// ```
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<UpdateStatusInput>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.tasks.update_status(&auth, id, input).await?))
}

/// Overwrite every editable field
///
/// Fields left out of the body are cleared (`description`, `assignedTo`,
/// `dueDate`) or rejected (`title`, `status`, `priority`).
pub async fn admin_update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(id): AppPath<i64>,
    AppJson(input): AppJson<AdminUpdateInput>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.tasks.admin_update(&auth, id, input).await?))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    AppPath(id): AppPath<i64>,
) -> ApiResult<Json<MessageResponse>> {
    Ok(Json(state.tasks.delete(&auth, id).await?))
}
