/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register new user
/// - `POST /auth/login` - Exchange credentials for a bearer token
/// - `GET /auth/users` - List users with the `user` role (admin only)

use crate::{app::AppState, error::ApiResult, extract::AppJson};
use axum::{extract::State, Json};
use taskdesk_shared::auth::middleware::AuthContext;
use taskdesk_shared::models::user::PublicUser;
use taskdesk_shared::services::identity::{LoginInput, LoginResponse, RegisterInput, RegisterResponse};

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "secret1",
///   "role": "user"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "User registered successfully",
///   "user": { "id": 1, "name": "Ada Lovelace", "email": "ada@example.com", "role": "user" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or email already exists
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterInput>,
) -> ApiResult<Json<RegisterResponse>> {
    Ok(Json(state.identity.register(input).await?))
}

/// Login
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": 1, "name": "Ada Lovelace", "email": "ada@example.com", "role": "user" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or invalid credentials
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginInput>,
) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(state.identity.login(input).await?))
}

/// List non-admin users, for the assignee picker
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<PublicUser>>> {
    Ok(Json(state.identity.list_users(&auth).await?))
}
