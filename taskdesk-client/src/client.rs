/// HTTP client for the TaskDesk API
///
/// Methods mirror the API routes one to one. Admin-only operations check the
/// session's role before sending anything and fail with
/// [`ClientError::RoleRequired`].
///
/// Non-2xx responses are decoded from the API's error body
/// (`{error, message, details?}`) into [`ClientError::Api`].

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskdesk_shared::models::task::{Task, TaskStatus};
use taskdesk_shared::models::user::{PublicUser, Role};
use taskdesk_shared::services::identity::{LoginInput, LoginResponse, RegisterInput, RegisterResponse};
use taskdesk_shared::services::tasks::{
    AdminUpdateInput, CreateTaskInput, CreateTaskResponse, ListTasksParams, TaskPage,
    TaskSummary, UpdateStatusInput,
};
use taskdesk_shared::services::{FieldError, MessageResponse};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::session::Session;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `GET /health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
    pub database: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(default)]
    details: Vec<FieldError>,
}

/// TaskDesk API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`, e.g. `http://localhost:8080`
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!("{base_url} cannot be a base URL")));
        }

        // Relative joins replace the last path segment unless it ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn health(&self) -> ClientResult<Health> {
        self.send(self.request(Method::GET, "/health")?).await
    }

    /// Registers an account; does not log in
    pub async fn register(&self, input: &RegisterInput) -> ClientResult<RegisterResponse> {
        self.send(self.request(Method::POST, "/auth/register")?.json(input))
            .await
    }

    /// Logs in and returns the new session
    ///
    /// Persisting it is up to the caller (see [`crate::SessionFile`]).
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let input = LoginInput {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: LoginResponse = self
            .send(self.request(Method::POST, "/auth/login")?.json(&input))
            .await?;

        debug!(user_id = response.user.id, role = %response.user.role, "Logged in");
        Ok(response.into())
    }

    /// Lists non-admin users (admin)
    pub async fn list_users(&self, session: &Session) -> ClientResult<Vec<PublicUser>> {
        session.require_role(Role::Admin)?;
        self.send(self.authed(Method::GET, "/auth/users", session)?).await
    }

    /// Creates a task (admin)
    pub async fn create_task(
        &self,
        session: &Session,
        input: &CreateTaskInput,
    ) -> ClientResult<CreateTaskResponse> {
        session.require_role(Role::Admin)?;
        self.send(self.authed(Method::POST, "/tasks", session)?.json(input))
            .await
    }

    /// Lists all tasks, oldest first
    pub async fn list_tasks(&self, session: &Session, params: &ListTasksParams) -> ClientResult<TaskPage> {
        self.send(self.authed(Method::GET, "/tasks", session)?.query(params))
            .await
    }

    /// Lists tasks assigned to `params.user_id` (default: the session's user), newest first
    pub async fn list_user_tasks(
        &self,
        session: &Session,
        params: &ListTasksParams,
    ) -> ClientResult<TaskPage> {
        self.send(self.authed(Method::GET, "/tasks/user", session)?.query(params))
            .await
    }

    pub async fn summary(&self, session: &Session) -> ClientResult<TaskSummary> {
        self.send(self.authed(Method::GET, "/tasks/summary", session)?)
            .await
    }

    pub async fn get_task(&self, session: &Session, id: i64) -> ClientResult<Task> {
        self.send(self.authed(Method::GET, &format!("/tasks/{id}"), session)?)
            .await
    }

    /// Sets a task's status (admin or assignee)
    pub async fn update_status(
        &self,
        session: &Session,
        id: i64,
        status: TaskStatus,
    ) -> ClientResult<MessageResponse> {
        let input = UpdateStatusInput {
            status: Some(status.to_string()),
        };

        self.send(self.authed(Method::PUT, &format!("/tasks/{id}"), session)?.json(&input))
            .await
    }

    /// Overwrites every editable field of a task (admin)
    pub async fn admin_update(
        &self,
        session: &Session,
        id: i64,
        input: &AdminUpdateInput,
    ) -> ClientResult<MessageResponse> {
        session.require_role(Role::Admin)?;
        self.send(self.authed(Method::PUT, &format!("/tasks/admin/{id}"), session)?.json(input))
            .await
    }

    /// Deletes a task (admin)
    pub async fn delete_task(&self, session: &Session, id: i64) -> ClientResult<MessageResponse> {
        session.require_role(Role::Admin)?;
        self.send(self.authed(Method::DELETE, &format!("/tasks/{id}"), session)?)
            .await
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(self.http.request(method, url))
    }

    fn authed(&self, method: Method, path: &str, session: &Session) -> ClientResult<RequestBuilder> {
        Ok(self.request(method, path)?.bearer_auth(session.bearer()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let text = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Api {
                status: status.as_u16(),
                code: body.error,
                message: body.message,
                details: body.details,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                code: "unknown".to_string(),
                message: text,
                details: Vec::new(),
            },
        };

        debug!(status = status.as_u16(), error = %error, "Request failed");
        Err(error)
    }
}
