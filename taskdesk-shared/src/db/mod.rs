/// Database layer for TaskDesk
///
/// - `pool`: PostgreSQL connection pool with a health check
/// - `migrations`: Embedded migration runner
///
/// The queries themselves live on the models in [`crate::models`].

pub mod migrations;
pub mod pool;
