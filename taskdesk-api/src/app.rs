/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdesk_api::{app::AppState, config::Config};
/// use taskdesk_shared::notify::DisabledNotifier;
/// use taskdesk_shared::store::memory::MemoryStore;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(DisabledNotifier), config);
/// let app = taskdesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        auth::{jwt_auth_layer, require_admin},
        security::SecurityHeadersLayer,
    },
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskdesk_shared::notify::Notifier;
use taskdesk_shared::services::identity::IdentityService;
use taskdesk_shared::services::tasks::TaskService;
use taskdesk_shared::store::Store;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is an `Arc` or holds only `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (Postgres in production, in-memory in tests)
    pub store: Arc<dyn Store>,

    /// Registration and login
    pub identity: IdentityService,

    /// Task lifecycle
    pub tasks: TaskService,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state, wiring the services onto one store
    pub fn new(store: Arc<dyn Store>, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        Self {
            identity: IdentityService::new(store.clone(), config.identity_config()),
            tasks: TaskService::new(store.clone(), notifier),
            store,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health              # Health check (public)
/// ├── /auth/
/// │   ├── POST   /register        # public
/// │   ├── POST   /login           # public
/// │   └── GET    /users           # admin
/// └── /tasks/                     # all authenticated
///     ├── GET    /                # list all tasks
///     ├── POST   /                # create (admin)
///     ├── GET    /summary         # per-status counts
///     ├── GET    /user?userId=    # tasks assigned to one user
///     ├── GET    /:id             # admin or assignee
///     ├── PUT    /:id             # status only; admin or assignee
///     ├── DELETE /:id             # admin
///     └── PUT    /admin/:id       # full edit (admin)
/// ```
///
/// Task routes that are admin-only are gated by the task service's policy,
/// so the 403 comes before any input validation.
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication and role gates (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register and login are public
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // User directory (admin only)
    let admin_auth_routes = Router::new()
        .route("/users", get(routes::auth::list_users))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    // Task routes (require JWT authentication)
    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/summary", get(routes::tasks::task_summary))
        .route("/user", get(routes::tasks::list_user_tasks))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task_status)
                .delete(routes::tasks::delete_task),
        )
        .route("/admin/:id", put(routes::tasks::admin_update_task))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_layer));

    // Configure CORS based on environment
    let cors = if state.config.cors_allows_any() {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes.merge(admin_auth_routes))
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
