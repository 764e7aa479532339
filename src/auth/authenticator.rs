use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::credentials::{CredentialRecord, CredentialStore};
use super::error::AuthError;
use super::password::PasswordHasher;
use super::session::{SessionId, SessionState, UserSession};
use super::store::SessionStore;
use super::SharedClock;
use crate::config::{SecurityConfig, MAX_SESSION_LIFETIME_SECS};

/// Knobs the authenticator reads from the security configuration
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub session_lifetime: Duration,
    pub reveal_unknown_accounts: bool,
    pub audit_logging: bool,
}

impl AuthSettings {
    /// Sessions must outlive the request that opens them and stay within the configured cap
    pub fn validate(&self) -> Result<(), AuthError> {
        let max = Duration::seconds(MAX_SESSION_LIFETIME_SECS);
        if self.session_lifetime <= Duration::zero() || self.session_lifetime > max {
            return Err(AuthError::InvalidSettings(format!(
                "session lifetime must be between 1 and {MAX_SESSION_LIFETIME_SECS} seconds, got {}",
                self.session_lifetime.num_seconds()
            )));
        }
        Ok(())
    }
}

impl TryFrom<&SecurityConfig> for AuthSettings {
    type Error = AuthError;

    fn try_from(config: &SecurityConfig) -> Result<Self, Self::Error> {
        // Checked before conversion: `Duration::seconds` panics far below i64::MAX
        if !(1..=MAX_SESSION_LIFETIME_SECS).contains(&config.session_lifetime_secs) {
            return Err(AuthError::InvalidSettings(format!(
                "session lifetime must be between 1 and {MAX_SESSION_LIFETIME_SECS} seconds, got {}",
                config.session_lifetime_secs
            )));
        }
        Ok(Self {
            session_lifetime: Duration::seconds(config.session_lifetime_secs),
            reveal_unknown_accounts: config.reveal_unknown_accounts,
            audit_logging: config.enable_audit_logging,
        })
    }
}

/// Verifies credentials, issues sessions and answers permission checks
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: PasswordHasher,
    clock: SharedClock,
    settings: AuthSettings,
    decoy_hash: String,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: PasswordHasher,
        clock: SharedClock,
        settings: AuthSettings,
    ) -> Result<Self, AuthError> {
        settings.validate()?;
        // Hash of a random secret nobody knows, so unknown emails pay for one verification
        let decoy_hash = super::password::hash_password(SessionId::generate().as_str(), hasher.cost())?;

        Ok(Self {
            credentials,
            sessions,
            hasher,
            clock,
            settings,
            decoy_hash,
        })
    }

    pub fn sessions(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    pub fn clock(&self) -> SharedClock {
        Arc::clone(&self.clock)
    }

    /// Check `email`/`password` and open a new session on success
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        let record = self
            .credentials
            .find_credential_by_email(email)
            .await
            .map_err(|e| {
                error!("Credential lookup failed: {}", e);
                AuthError::unavailable(e)
            })?;

        let record = match record {
            Some(record) => record,
            None => {
                self.hasher.verify(password, &self.decoy_hash).await?;
                if self.settings.audit_logging {
                    warn!(email, "Login failed: unknown account");
                }
                return Err(if self.settings.reveal_unknown_accounts {
                    AuthError::NotFound {
                        email: email.to_string(),
                    }
                } else {
                    AuthError::InvalidCredentials
                });
            }
        };

        if !self.hasher.verify(password, &record.password_hash).await? {
            if self.settings.audit_logging {
                warn!(user_id = record.user_id, "Login failed: wrong password");
            }
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.issue(&record)?;
        self.sessions.put(&session).await.map_err(|e| {
            error!("Failed to store session: {}", e);
            AuthError::unavailable(e)
        })?;

        if self.settings.audit_logging {
            info!(user_id = record.user_id, role = %record.role, "Login succeeded");
        }
        Ok(session)
    }

    fn issue(&self, record: &CredentialRecord) -> Result<UserSession, AuthError> {
        let now = self.clock.utc();
        let expires_at = now
            .checked_add_signed(self.settings.session_lifetime)
            .ok_or_else(|| AuthError::InvalidSettings("session expiry out of range".into()))?;

        Ok(UserSession::new(
            SessionId::generate(),
            record.user_id,
            record.name.clone(),
            record.email.clone(),
            record.role,
            record.permissions.clone(),
            now,
            expires_at,
        ))
    }

    /// Permission check against the current time. Does not touch the store.
    pub fn authorize(&self, session: &UserSession, permission: &str) -> Result<(), AuthError> {
        authorize_at(session, permission, self.clock.utc())
    }

    /// Load the live session behind a presented identifier
    pub async fn resolve(&self, id: &SessionId) -> Result<UserSession, AuthError> {
        let session = self
            .sessions
            .get(id)
            .await
            .map_err(AuthError::unavailable)?
            .ok_or(AuthError::Unauthenticated)?;

        if session.is_expired_at(self.clock.utc()) {
            debug!(user_id = session.user_id, "Presented session has expired");
            self.sessions.delete(id).await.map_err(AuthError::unavailable)?;
            return Err(AuthError::ExpiredSession);
        }

        Ok(session)
    }

    /// Where a presented identifier currently stands
    pub async fn state(&self, id: &SessionId) -> Result<SessionState, AuthError> {
        match self.resolve(id).await {
            Ok(_) => Ok(SessionState::Authenticated),
            Err(AuthError::ExpiredSession) => Ok(SessionState::Expired),
            Err(AuthError::Unauthenticated) => Ok(SessionState::Anonymous),
            Err(e) => Err(e),
        }
    }

    /// Log out. The identifier can no longer be resolved afterwards.
    pub async fn invalidate(&self, session: &UserSession) -> Result<SessionState, AuthError> {
        self.sessions
            .delete(session.id())
            .await
            .map_err(AuthError::unavailable)?;

        if self.settings.audit_logging {
            info!(user_id = session.user_id, "Logged out");
        }
        Ok(SessionState::LoggedOut)
    }

    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        self.sessions
            .purge_expired(self.clock.utc())
            .await
            .map_err(AuthError::unavailable)
    }
}

/// Admins pass every check; others need the permission (or its product alias)
pub fn authorize_at(
    session: &UserSession,
    permission: &str,
    now: DateTime<Utc>,
) -> Result<(), AuthError> {
    if session.is_expired_at(now) {
        return Err(AuthError::ExpiredSession);
    }
    if session.is_admin() || session.permissions.grants(permission) {
        return Ok(());
    }
    Err(AuthError::Forbidden {
        permission: permission.to_string(),
    })
}
