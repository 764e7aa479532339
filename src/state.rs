use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{
    AuthError, AuthSettings, Authenticator, CredentialStore, InMemoryCredentialStore,
    InMemorySessionStore, PasswordHasher, SessionStore, SharedClock,
};
use crate::config::{AppConfig, SessionBackend};
use crate::database::{DatabaseError, DatabaseManager, PgCredentialStore, PgSessionStore};
use crate::services::AccountService;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Everything a request handler needs, built once per process
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub authenticator: Arc<Authenticator>,
    pub accounts: Arc<AccountService>,
    pub database: Option<DatabaseManager>,
}

impl AppState {
    /// Wire stores from configuration: Postgres when a database URL is set,
    /// process memory otherwise
    pub fn build(config: AppConfig, clock: SharedClock) -> Result<Self, StateError> {
        let database = match config.database.url {
            Some(_) => Some(DatabaseManager::connect(&config.database)?),
            None => None,
        };

        let credentials: Arc<dyn CredentialStore> = match &database {
            Some(db) => Arc::new(PgCredentialStore::new(db.pool().clone())),
            None => {
                warn!("DATABASE_URL not set, accounts are kept in memory");
                Arc::new(InMemoryCredentialStore::new())
            }
        };

        let sessions: Arc<dyn SessionStore> = match (config.security.session_backend, &database) {
            (SessionBackend::Postgres, Some(db)) => Arc::new(PgSessionStore::new(db.pool().clone())),
            (SessionBackend::Postgres, None) => {
                warn!("Postgres session backend requested without a database, using memory");
                Arc::new(InMemorySessionStore::new())
            }
            (SessionBackend::Memory, _) => Arc::new(InMemorySessionStore::new()),
        };

        let state = Self::with_stores(config, credentials, sessions, database, clock)?;
        info!(
            environment = ?state.config.environment,
            session_backend = ?state.config.security.session_backend,
            "Application state ready"
        );
        Ok(state)
    }

    /// Assemble state around explicit stores
    pub fn with_stores(
        config: AppConfig,
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        database: Option<DatabaseManager>,
        clock: SharedClock,
    ) -> Result<Self, AuthError> {
        let hasher = PasswordHasher::new(config.security.bcrypt_cost)?;
        let authenticator = Authenticator::new(
            Arc::clone(&credentials),
            Arc::clone(&sessions),
            hasher,
            clock,
            AuthSettings::try_from(&config.security)?,
        )?;
        let accounts = AccountService::new(credentials, sessions, hasher, &config.validation);

        Ok(Self {
            config: Arc::new(config),
            authenticator: Arc::new(authenticator),
            accounts: Arc::new(accounts),
            database,
        })
    }
}
