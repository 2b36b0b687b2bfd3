/// Middleware modules for the API server
///
/// - `security`: Security response headers
/// - `auth`: Bearer authentication and role gates

pub mod auth;
pub mod security;
