use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::auth::{PermissionSet, Role, SessionId, UserSession};

/// Row of the `sessions` table. Holds the identifier's digest, never the identifier.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub token_digest: String,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub permissions: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRow {
    /// Rebuild the session for the identifier that was looked up
    pub fn into_session(self, id: SessionId) -> UserSession {
        UserSession::new(
            id,
            self.user_id,
            self.name,
            self.email,
            Role::from_stored(&self.role),
            PermissionSet::parse(&self.permissions),
            self.issued_at,
            self.expires_at,
        )
    }
}
