use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

use super::permissions::{PermissionSet, Role};

/// Stored login credentials of one account
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

/// Account to create. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

/// Replacement profile and access for an existing account
#[derive(Debug, Clone)]
pub struct CredentialUpdate {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: PermissionSet,
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Credential store error: {0}")]
    Backend(String),
}

/// Read side used by the authenticator, write side used by account management
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Case-insensitive lookup
    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;

    async fn find_credential_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;

    /// Every account, oldest first
    async fn list_credentials(&self) -> Result<Vec<CredentialRecord>, CredentialStoreError>;

    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CredentialStoreError>;

    /// `None` when no such account exists. The password hash is left as is.
    async fn update_credential(
        &self,
        user_id: i64,
        update: CredentialUpdate,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;

    /// Returns whether an account was removed
    async fn delete_credential(&self, user_id: i64) -> Result<bool, CredentialStoreError>;

    /// When no admin is left, make the oldest account an admin with every module.
    /// Returns the promoted account.
    async fn promote_oldest_if_no_admin(
        &self,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError>;
}

/// Process-local credential store for tests and database-less runs
#[derive(Debug)]
pub struct InMemoryCredentialStore {
    records: RwLock<Vec<CredentialRecord>>,
    next_id: AtomicI64,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_credential_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| r.email.eq_ignore_ascii_case(email.trim()))
            .cloned())
    }

    async fn find_credential_by_id(
        &self,
        user_id: i64,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.user_id == user_id).cloned())
    }

    async fn list_credentials(&self) -> Result<Vec<CredentialRecord>, CredentialStoreError> {
        // Ids only grow and records are appended, so insertion order is id order
        Ok(self.records.read().await.clone())
    }

    async fn create_credential(
        &self,
        credential: NewCredential,
    ) -> Result<CredentialRecord, CredentialStoreError> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.email.eq_ignore_ascii_case(&credential.email))
        {
            return Err(CredentialStoreError::DuplicateEmail(credential.email));
        }

        let record = CredentialRecord {
            user_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            name: credential.name,
            email: credential.email,
            password_hash: credential.password_hash,
            role: credential.role,
            permissions: credential.permissions,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn update_credential(
        &self,
        user_id: i64,
        update: CredentialUpdate,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.user_id != user_id && r.email.eq_ignore_ascii_case(&update.email))
        {
            return Err(CredentialStoreError::DuplicateEmail(update.email));
        }

        let Some(record) = records.iter_mut().find(|r| r.user_id == user_id) else {
            return Ok(None);
        };
        record.name = update.name;
        record.email = update.email;
        record.role = update.role;
        record.permissions = update.permissions;
        Ok(Some(record.clone()))
    }

    async fn delete_credential(&self, user_id: i64) -> Result<bool, CredentialStoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok(records.len() < before)
    }

    async fn promote_oldest_if_no_admin(
        &self,
    ) -> Result<Option<CredentialRecord>, CredentialStoreError> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.role == Role::Admin) {
            return Ok(None);
        }

        let Some(oldest) = records.iter_mut().min_by_key(|r| r.user_id) else {
            return Ok(None);
        };
        oldest.role = Role::Admin;
        oldest.permissions = PermissionSet::default_for(Role::Admin);
        Ok(Some(oldest.clone()))
    }
}
