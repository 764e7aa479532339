// handlers/protected/auth/session.rs - session-scoped endpoints

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Serialize;

use crate::auth::UserSession;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PermissionCheck {
    pub permission: String,
    pub granted: bool,
}

/// GET /api/auth/whoami - Current session's user, role, permissions and expiry
pub async fn whoami(Extension(AuthUser(session)): Extension<AuthUser>) -> ApiResult<UserSession> {
    Ok(ApiResponse::success(session))
}

/// GET /api/auth/permissions/:permission - `200` if the session holds the permission, `403` otherwise
pub async fn check_permission(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
    Path(permission): Path<String>,
) -> ApiResult<PermissionCheck> {
    state.authenticator.authorize(&session, &permission)?;
    Ok(ApiResponse::success(PermissionCheck {
        permission,
        granted: true,
    }))
}

/// DELETE /api/auth/session - Log out; the token stops working immediately
pub async fn logout(
    State(state): State<AppState>,
    Extension(AuthUser(session)): Extension<AuthUser>,
) -> Result<ApiResponse<()>, ApiError> {
    state.authenticator.invalidate(&session).await?;
    Ok(ApiResponse::no_content())
}
