//! # TaskDesk API Server Library
//!
//! This library provides the HTTP layer of TaskDesk: configuration, error
//! mapping, middleware, and route handlers over the shared services.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with the JSON error format
//! - `middleware`: Authentication, role gates, and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
