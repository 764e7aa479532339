#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;

use golden_turf::auth::{
    hash_password, CredentialStore, InMemoryCredentialStore, InMemorySessionStore, NewCredential,
    PermissionSet, Role,
};
use golden_turf::config::AppConfig;
use golden_turf::testing::{MutableClock, TEST_BCRYPT_COST};
use golden_turf::{app, AppState};

/// The full router over in-memory stores, driven in-process
pub struct TestApp {
    pub router: Router,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub sessions: Arc<InMemorySessionStore>,
    /// Time seen by the authenticator; advance it to expire sessions
    pub clock: Arc<MutableClock>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let mut config = AppConfig::from_env();
        config.database.url = None;
        config.security.bcrypt_cost = TEST_BCRYPT_COST;
        config.security.session_lifetime_secs = 3600;
        config.security.reveal_unknown_accounts = false;
        config.validation.password_min_length = 8;
        config.validation.password_require_special = false;
        config.validation.password_require_mixed_case = false;

        let credentials = Arc::new(InMemoryCredentialStore::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let state = AppState::with_stores(
            config,
            credentials.clone(),
            sessions.clone(),
            None,
            clock.clone(),
        )?;

        Ok(Self {
            router: app(state),
            credentials,
            sessions,
            clock,
        })
    }

    pub async fn seed_user(&self, email: &str, password: &str, role: Role, permissions: &str) -> Result<i64> {
        let record = self
            .credentials
            .create_credential(NewCredential {
                name: "Seeded User".to_string(),
                email: email.to_string(),
                password_hash: hash_password(password, TEST_BCRYPT_COST)?,
                role,
                permissions: PermissionSet::parse(permissions),
            })
            .await?;
        Ok(record.user_id)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };

        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    /// Log in and return the session token
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .post("/auth/login", serde_json::json!({ "email": email, "password": password }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::OK, "login failed: {} {}", res.status, res.body);
        res.body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }
}
