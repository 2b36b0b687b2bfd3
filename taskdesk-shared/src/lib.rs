//! # TaskDesk Shared Library
//!
//! This crate contains the domain types, storage seam, and business logic used by
//! the TaskDesk API server and client.
//!
//! ## Module Organization
//!
//! - `models`: Users and tasks, plus their Postgres queries
//! - `auth`: Password hashing, bearer tokens, request authentication, task policy
//! - `db`: Connection pool and migrations
//! - `store`: Storage traits with Postgres and in-memory implementations
//! - `notify`: Best-effort assignment emails through an HTTP mail relay
//! - `services`: Identity and task services consumed by the HTTP layer

pub mod auth;
pub mod db;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
