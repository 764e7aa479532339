// handlers/public/auth/register.rs - POST /auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::auth::{CredentialRecord, PermissionSet, Role};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Registration;
use crate::state::AppState;

/// Account as returned to clients; never includes the password hash
#[derive(Debug, Serialize)]
pub struct AccountView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

impl From<CredentialRecord> for AccountView {
    fn from(record: CredentialRecord) -> Self {
        Self {
            id: record.user_id,
            name: record.name,
            email: record.email,
            role: record.role,
            permissions: record.permissions,
        }
    }
}

/// POST /auth/register - Create a regular user account
///
/// Expected Input:
/// ```json
/// { "name": "Ada Lovelace", "email": "ada@example.com", "password": "..." }
/// ```
///
/// Responds `201` with the account, `409` if the email is taken and `422`
/// with field errors when validation fails.
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<AccountView> {
    let Json(registration) = payload?;
    let record = state.accounts.register(&registration, Role::User).await?;
    Ok(ApiResponse::created(record.into()))
}
