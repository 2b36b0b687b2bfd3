//! Common test utilities for router tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app built on the in-memory store, no database needed
//! - A notifier that records emails instead of sending them
//! - Helpers to register users, log in, and send JSON requests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use taskdesk_api::app::{build_router, AppState};
use taskdesk_api::config::Config;
use taskdesk_shared::notify::{Email, Notifier, NotifyError};
use taskdesk_shared::store::memory::MemoryStore;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "router-test-secret-at-least-32-bytes";

/// Notifier that keeps every email it is handed
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Email>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: &Email) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// A registered, logged-in user
pub struct Session {
    pub id: i64,
    pub token: String,
}

impl Session {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test context containing the app and its collaborators
pub struct TestContext {
    pub app: axum::Router,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    /// Builds an app over a fresh in-memory store
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Builds an app with extra configuration variables
    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let mut vars: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://unused/test".to_string()),
            ("JWT_SECRET".to_string(), JWT_SECRET.to_string()),
        ]);
        vars.extend(extra.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(Arc::new(MemoryStore::new()), notifier.clone(), config);

        Self {
            app: build_router(state),
            notifier,
        }
    }

    /// Sends a request and returns the status and JSON body (`Null` if empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&Session>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = auth {
            builder = builder.header("authorization", session.bearer());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a prebuilt request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Registers a user and logs them in
    pub async fn sign_up(&self, name: &str, email: &str, role: &str) -> Session {
        let (status, body) = self
            .send(
                "POST",
                "/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "secret1", "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let (status, body) = self
            .send(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": "secret1" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");

        Session {
            id: body["user"]["id"].as_i64().unwrap(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn admin(&self) -> Session {
        self.sign_up("Admin User", "admin@example.com", "admin").await
    }

    pub async fn user(&self, name: &str) -> Session {
        let email = format!("{}@example.com", name.to_lowercase());
        self.sign_up(name, &email, "user").await
    }

    /// Creates a task as `admin` and returns its id
    pub async fn create_task(&self, admin: &Session, body: Value) -> i64 {
        let (status, response) = self.send("POST", "/tasks", Some(admin), Some(body)).await;
        assert_eq!(status, StatusCode::OK, "create failed: {response}");
        response["task"]["id"].as_i64().unwrap()
    }
}
