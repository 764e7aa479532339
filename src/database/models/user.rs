use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::auth::{CredentialRecord, PermissionSet, Role};

/// Row of the `users` table
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for CredentialRecord {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: Role::from_stored(&row.role),
            permissions: PermissionSet::parse(&row.permissions),
        }
    }
}
