//! # TaskDesk API Server
//!
//! HTTP API for TaskDesk: users register and log in, admins create and assign
//! tasks, and users work through the tasks assigned to them.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Initialize tracing (`LOG_FORMAT=json` for structured output)
//! 3. Create the database if needed, connect, and run migrations
//! 4. Pick the notifier: HTTP mail relay if `MAIL_RELAY_URL` is set, otherwise disabled
//! 5. Serve until Ctrl-C, then drain in-flight requests
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdesk-api
//! ```

use std::sync::Arc;
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::{Config, LogFormat};
use taskdesk_shared::db::migrations::{ensure_database_exists, run_migrations};
use taskdesk_shared::db::pool::{close_pool, create_pool};
use taskdesk_shared::notify::relay::HttpMailRelay;
use taskdesk_shared::notify::{DisabledNotifier, Notifier};
use taskdesk_shared::store::postgres::PgStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "taskdesk_api=debug,taskdesk_shared=debug,tower_http=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "TaskDesk API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let notifier: Arc<dyn Notifier> = match config.relay_config() {
        Some(relay) => {
            tracing::info!(url = %relay.url, "Assignment emails enabled");
            Arc::new(HttpMailRelay::new(relay)?)
        }
        None => {
            tracing::warn!("MAIL_RELAY_URL not set, assignment emails disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), notifier, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
