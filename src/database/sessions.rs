use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::SessionRow;
use crate::auth::{SessionId, SessionStore, SessionStoreError, UserSession};

/// Sessions kept in the `sessions` table, shared by every server process
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> SessionStoreError {
    SessionStoreError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn put(&self, session: &UserSession) -> Result<(), SessionStoreError> {
        sqlx::query(
            "INSERT INTO sessions
                (token_digest, user_id, name, email, role, permissions, issued_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(session.id().digest())
        .bind(session.user_id)
        .bind(&session.name)
        .bind(&session.email)
        .bind(session.role.as_str())
        .bind(session.permissions.to_stored())
        .bind(session.issued_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<UserSession>, SessionStoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT token_digest, user_id, name, email, role, permissions, issued_at, expires_at
             FROM sessions
             WHERE token_digest = $1",
        )
        .bind(id.digest())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(|row| row.into_session(id.clone())))
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_digest = $1")
            .bind(id.digest())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }

    async fn delete_for_user(&self, user_id: i64) -> Result<u64, SessionStoreError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected())
    }
}
