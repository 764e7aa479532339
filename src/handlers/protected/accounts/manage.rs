// handlers/protected/accounts/manage.rs - account administration, gated by the `profiles` permission

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::auth::{Role, UserSession};
use crate::error::ApiError;
use crate::handlers::public::auth::register::AccountView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::{AccountUpdate, Registration};
use crate::state::AppState;

const PROFILES: &str = "profiles";

#[derive(Debug, Deserialize)]
pub struct NewAccount {
    #[serde(flatten)]
    pub registration: Registration,
    #[serde(default)]
    pub role: Option<Role>,
}

fn require_profiles(state: &AppState, session: &UserSession) -> Result<(), ApiError> {
    state.authenticator.authorize(session, PROFILES)?;
    Ok(())
}

/// GET /api/accounts - Every account, oldest first
pub async fn list(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
) -> ApiResult<Vec<AccountView>> {
    require_profiles(&state, &session)?;
    let accounts = state.accounts.list_accounts().await?;
    Ok(ApiResponse::success(
        accounts.into_iter().map(AccountView::from).collect(),
    ))
}

/// POST /api/accounts - Create an account with a chosen role
///
/// Expected Input:
/// ```json
/// { "name": "Ada Lovelace", "email": "ada@example.com", "password": "...", "role": "admin" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> ApiResult<AccountView> {
    require_profiles(&state, &session)?;
    let Json(account) = payload?;
    let record = state
        .accounts
        .register(&account.registration, account.role.unwrap_or(Role::User))
        .await?;
    Ok(ApiResponse::created(record.into()))
}

/// PUT /api/accounts/:id - Rewrite profile, role and permissions; revokes the account's sessions
pub async fn update(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
    Path(user_id): Path<i64>,
    payload: Result<Json<AccountUpdate>, JsonRejection>,
) -> ApiResult<AccountView> {
    require_profiles(&state, &session)?;
    let Json(update) = payload?;
    let record = state.accounts.update_account(user_id, &update).await?;
    Ok(ApiResponse::success(record.into()))
}

/// POST /api/accounts/:id/toggle-admin - Switch between admin and user
pub async fn toggle_admin(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> ApiResult<AccountView> {
    require_profiles(&state, &session)?;
    let record = state.accounts.toggle_admin(user_id).await?;
    Ok(ApiResponse::success(record.into()))
}

/// DELETE /api/accounts/:id - Remove the account and its sessions
pub async fn delete(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
    Path(user_id): Path<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    require_profiles(&state, &session)?;
    state.accounts.delete_account(user_id).await?;
    Ok(ApiResponse::no_content())
}
