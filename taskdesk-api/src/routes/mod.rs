/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, and the user directory
/// - `tasks`: Task lifecycle endpoints

pub mod auth;
pub mod health;
pub mod tasks;
