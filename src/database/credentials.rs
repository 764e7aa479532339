use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

use super::models::UserRow;
use crate::auth::{
    CredentialRecord, CredentialStore, CredentialStoreError, CredentialUpdate, NewCredential,
    PermissionSet, Role,
};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, permissions, created_at";

/// Credentials kept in the `users` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> CredentialStoreError {
    error!("Credential query failed: {}", err);
    CredentialStoreError::Backend(err.to_string())
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(CredentialRecord::from))
    }

    async fn find_credential_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(CredentialRecord::from))
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialRecord>, CredentialStoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(CredentialRecord::from).collect())
    }

    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CredentialStoreError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, role, permissions)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&credential.name)
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .bind(credential.role.as_str())
        .bind(credential.permissions.to_stored())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CredentialStoreError::DuplicateEmail(credential.email))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn update_credential(
        &self,
        user_id: i64,
        update: CredentialUpdate,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let result = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET name = $2, email = $3, role = $4, permissions = $5
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.email)
        .bind(update.role.as_str())
        .bind(update.permissions.to_stored())
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.map(CredentialRecord::from)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(CredentialStoreError::DuplicateEmail(update.email))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn delete_credential(&self, user_id: i64) -> Result<bool, CredentialStoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn promote_oldest_if_no_admin(
        &self,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        // Single statement so two concurrent callers cannot both promote
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $1, permissions = $2
             WHERE id = (SELECT min(id) FROM users)
               AND NOT EXISTS (SELECT 1 FROM users WHERE role = $1)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(Role::Admin.as_str())
        .bind(PermissionSet::default_for(Role::Admin).to_stored())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(CredentialRecord::from))
    }
}
