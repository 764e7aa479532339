// handlers/public/auth/login.rs - POST /auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::UserSession;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{EmailConstraints, FieldRule, FormValidator, PasswordConstraints};

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: UserSession,
}

/// Presence checks only; strength rules apply at registration. The password
/// goes through the same acceptance step registration uses.
fn login_form() -> FormValidator {
    FormValidator::new()
        .rule(FieldRule::<EmailConstraints>::with_defaults("email"))
        .rule(FieldRule::new("password", PasswordConstraints::acceptance_only()))
}

/// POST /auth/login - Authenticate with email and password and receive a session token
///
/// Expected Input:
/// ```json
/// { "email": "user@example.com", "password": "..." }
/// ```
///
/// The returned `token` goes in `Authorization: Bearer <token>` on protected routes.
pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;

    let form = login_form().validate(|field| match field {
        "email" => request.email.clone(),
        "password" => request.password.clone(),
        _ => None,
    })?;

    let email = form.text("email").unwrap_or_default();
    let password = form.text("password").unwrap_or_default();

    let session = state.authenticator.authenticate(email, password).await?;

    Ok(ApiResponse::success(LoginResponse {
        token: session.id().as_str().to_string(),
        token_type: "Bearer",
        expires_in: (session.expires_at - session.issued_at).num_seconds(),
        user: session,
    }))
}
