//! Session authentication: credential checks, server-side sessions and
//! permission enforcement.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod password;
pub mod permissions;
pub mod session;
pub mod store;

use std::sync::Arc;

pub use authenticator::{authorize_at, AuthSettings, Authenticator};
pub use credentials::{
    CredentialRecord, CredentialStore, CredentialStoreError, CredentialUpdate,
    InMemoryCredentialStore, NewCredential,
};
pub use error::AuthError;
pub use password::{hash_password, verify_password, PasswordHasher, MAX_PASSWORD_BYTES};
pub use permissions::{PermissionSet, Role, MODULES};
pub use session::{SessionId, SessionState, UserSession};
pub use store::{spawn_session_sweeper, InMemorySessionStore, SessionStore, SessionStoreError};

/// Time source shared by the authenticator and the session sweeper
pub type SharedClock = Arc<dyn mockable::Clock + Send + Sync>;
