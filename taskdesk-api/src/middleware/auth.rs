/// Authentication and role-gate middleware
///
/// ```text
/// request ─▶ jwt_auth_layer ─▶ require_admin ─▶ handler
///              401 on bad token   403 on wrong role
/// ```
///
/// `jwt_auth_layer` injects [`AuthContext`] into request extensions; handlers and
/// `require_admin` read it back through the `AuthContext` extractor.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskdesk_shared::auth::authorization::require_role;
use taskdesk_shared::auth::middleware::{authenticate, AuthContext};
use taskdesk_shared::models::user::Role;

use crate::app::AppState;
use crate::error::ApiError;

/// JWT authentication middleware layer
///
/// Validates the bearer token's signature, issuer, and expiry, then injects
/// `AuthContext` into request extensions.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Admin role gate; must run inside [`jwt_auth_layer`]
pub async fn require_admin(auth: AuthContext, req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(&auth, Role::Admin)?;

    Ok(next.run(req).await)
}
