use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{
    AuthError, CredentialRecord, CredentialStore, CredentialStoreError, CredentialUpdate,
    NewCredential, PasswordHasher, PermissionSet, Role, SessionStore, MODULES,
};
use crate::config::ValidationConfig;
use crate::validation::{
    validate_choice, ChoiceConstraints, EmailConstraints, FieldRule, FormErrors, FormValidator,
    NameConstraints, PasswordConstraints, ValidatedForm, ValidationError,
};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Validation(#[from] FormErrors),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("No account with id {0}")]
    NotFound(i64),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Account store unavailable: {0}")]
    Unavailable(String),
}

impl From<CredentialStoreError> for AccountError {
    fn from(err: CredentialStoreError) -> Self {
        match err {
            CredentialStoreError::DuplicateEmail(email) => AccountError::DuplicateEmail(email),
            CredentialStoreError::Backend(detail) => AccountError::Unavailable(detail),
        }
    }
}

/// Raw sign-up fields as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Registration {
    fn field(&self, field: &str) -> Option<String> {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            "password" => self.password.clone(),
            _ => None,
        }
    }
}

/// Profile and access changes to an existing account. A missing role keeps the
/// current one; missing permissions keep the current grants unless the role changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub permissions: Option<Vec<String>>,
}

impl AccountUpdate {
    fn field(&self, field: &str) -> Option<String> {
        match field {
            "name" => self.name.clone(),
            "email" => self.email.clone(),
            _ => None,
        }
    }
}

/// Creates and manages accounts. Any change to an account's access revokes its
/// sessions, since sessions carry the role and permissions granted at login.
pub struct AccountService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    password_policy: PasswordConstraints,
}

impl AccountService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
        validation: &ValidationConfig,
    ) -> Self {
        Self {
            credentials,
            sessions,
            hasher,
            password_policy: validation.password_constraints(),
        }
    }

    fn profile_form() -> FormValidator {
        FormValidator::new()
            .rule(FieldRule::<NameConstraints>::with_defaults("name"))
            .rule(FieldRule::<EmailConstraints>::with_defaults("email"))
    }

    fn registration_form(&self) -> FormValidator {
        Self::profile_form().rule(FieldRule::new("password", self.password_policy.clone()))
    }

    /// Validate, hash and store a new account. Admins get every module, users get the dashboard.
    pub async fn register(
        &self,
        registration: &Registration,
        role: Role,
    ) -> Result<CredentialRecord, AccountError> {
        let form = self
            .registration_form()
            .validate(|field| registration.field(field))?;

        let email = form.text("email").unwrap_or_default().to_string();
        let password_hash = self
            .hasher
            .hash(form.text("password").unwrap_or_default())
            .await?;

        let record = self
            .credentials
            .create_credential(NewCredential {
                name: form.text("name").unwrap_or_default().to_string(),
                email,
                password_hash,
                role,
                permissions: PermissionSet::default_for(role),
            })
            .await?;

        info!(user_id = record.user_id, role = %record.role, "Registered account");
        Ok(record)
    }

    pub async fn list_accounts(&self) -> Result<Vec<CredentialRecord>, AccountError> {
        Ok(self.credentials.list_credentials().await?)
    }

    async fn find(&self, user_id: i64) -> Result<CredentialRecord, AccountError> {
        self.credentials
            .find_credential_by_id(user_id)
            .await?
            .ok_or(AccountError::NotFound(user_id))
    }

    /// Rewrite name, email, role and permissions. Admins always hold every module.
    pub async fn update_account(
        &self,
        user_id: i64,
        update: &AccountUpdate,
    ) -> Result<CredentialRecord, AccountError> {
        let current = self.find(user_id).await?;
        let role = update.role.unwrap_or(current.role);

        let form = Self::profile_form().validate(|field| update.field(field));
        let permissions = permissions_for(role, update.permissions.as_deref(), &current);
        let (form, permissions) = match (form, permissions) {
            (Ok(form), Ok(permissions)) => (form, permissions),
            (form, permissions) => {
                let errors: FormErrors = form
                    .err()
                    .map(|e| e.errors().to_vec())
                    .unwrap_or_default()
                    .into_iter()
                    .chain(permissions.err().unwrap_or_default())
                    .collect();
                return Err(errors.into());
            }
        };

        let updated = self
            .apply(user_id, profile_update(&form, role, permissions))
            .await?;
        info!(user_id, role = %updated.role, "Updated account");
        self.settle(updated).await
    }

    /// Flip between admin and user, resetting permissions to the role's defaults
    pub async fn toggle_admin(&self, user_id: i64) -> Result<CredentialRecord, AccountError> {
        let current = self.find(user_id).await?;
        let role = match current.role {
            Role::Admin => Role::User,
            Role::User => Role::Admin,
        };

        let updated = self
            .apply(
                user_id,
                CredentialUpdate {
                    name: current.name,
                    email: current.email,
                    role,
                    permissions: PermissionSet::default_for(role),
                },
            )
            .await?;
        info!(user_id, role = %role, "Toggled admin role");
        self.settle(updated).await
    }

    pub async fn delete_account(&self, user_id: i64) -> Result<(), AccountError> {
        if !self.credentials.delete_credential(user_id).await? {
            return Err(AccountError::NotFound(user_id));
        }
        self.revoke_sessions(user_id).await?;
        info!(user_id, "Deleted account");

        self.ensure_admin_exists().await?;
        Ok(())
    }

    /// Promote the oldest account when no admin is left. Returns the promoted account.
    pub async fn ensure_admin_exists(&self) -> Result<Option<CredentialRecord>, AccountError> {
        let promoted = self.credentials.promote_oldest_if_no_admin().await?;
        if let Some(record) = &promoted {
            self.revoke_sessions(record.user_id).await?;
            warn!(user_id = record.user_id, "No admin remained, promoted oldest account");
        }
        Ok(promoted)
    }

    async fn apply(
        &self,
        user_id: i64,
        update: CredentialUpdate,
    ) -> Result<CredentialRecord, AccountError> {
        let updated = self
            .credentials
            .update_credential(user_id, update)
            .await?
            .ok_or(AccountError::NotFound(user_id))?;
        self.revoke_sessions(user_id).await?;
        Ok(updated)
    }

    /// Keep an admin around after an access change, reporting the account's final state
    async fn settle(&self, updated: CredentialRecord) -> Result<CredentialRecord, AccountError> {
        match self.ensure_admin_exists().await? {
            Some(promoted) if promoted.user_id == updated.user_id => Ok(promoted),
            _ => Ok(updated),
        }
    }

    async fn revoke_sessions(&self, user_id: i64) -> Result<(), AccountError> {
        let revoked = self
            .sessions
            .delete_for_user(user_id)
            .await
            .map_err(|e| AccountError::Unavailable(e.to_string()))?;
        if revoked > 0 {
            info!(user_id, revoked, "Revoked sessions after account change");
        }
        Ok(())
    }
}

fn profile_update(form: &ValidatedForm, role: Role, permissions: PermissionSet) -> CredentialUpdate {
    CredentialUpdate {
        name: form.text("name").unwrap_or_default().to_string(),
        email: form.text("email").unwrap_or_default().to_string(),
        role,
        permissions,
    }
}

/// Grants for `role`: every module for admins, otherwise the requested modules,
/// the current grants, or the default when the role changes
fn permissions_for(
    role: Role,
    requested: Option<&[String]>,
    current: &CredentialRecord,
) -> Result<PermissionSet, Vec<ValidationError>> {
    if role == Role::Admin {
        return Ok(PermissionSet::default_for(Role::Admin));
    }
    let Some(requested) = requested else {
        return Ok(if current.role == role {
            current.permissions.clone()
        } else {
            PermissionSet::default_for(role)
        });
    };

    let rule = FieldRule::new("permissions", ChoiceConstraints::of(MODULES));
    let mut granted = Vec::new();
    let mut errors = Vec::new();
    for permission in requested {
        match validate_choice(Some(permission.as_str()), &rule) {
            Ok(Some(permission)) => granted.push(permission),
            Ok(None) => {}
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(granted.into_iter().collect())
    } else {
        Err(errors)
    }
}
