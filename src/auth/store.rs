use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::session::{SessionId, UserSession};
use super::SharedClock;

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Session store error: {0}")]
    Backend(String),
}

/// Registry of live sessions, keyed by the digest of their identifier
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session: &UserSession) -> Result<(), SessionStoreError>;

    async fn get(&self, id: &SessionId) -> Result<Option<UserSession>, SessionStoreError>;

    /// Returns whether a session was removed
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionStoreError>;

    /// Drop every session whose expiry is at or before `now`; returns the count removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError>;

    /// Revoke every session of one account; returns the count removed
    async fn delete_for_user(&self, user_id: i64) -> Result<u64, SessionStoreError>;
}

/// Sessions held in process memory
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, UserSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: &UserSession) -> Result<(), SessionStoreError> {
        self.sessions
            .write()
            .await
            .insert(session.id().digest(), session.clone());
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<UserSession>, SessionStoreError> {
        Ok(self.sessions.read().await.get(&id.digest()).cloned())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionStoreError> {
        Ok(self.sessions.write().await.remove(&id.digest()).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_for_user(&self, user_id: i64) -> Result<u64, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }
}

/// Periodically purge expired sessions until the task is aborted
pub fn spawn_session_sweeper(
    store: Arc<dyn SessionStore>,
    clock: SharedClock,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match store.purge_expired(clock.utc()).await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired sessions"),
                Err(e) => error!("Session sweep failed: {}", e),
            }
        }
    })
}
