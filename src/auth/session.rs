use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

use super::permissions::{PermissionSet, Role};

const SESSION_ID_BYTES: usize = 32;

/// Opaque bearer identifier of a server-side session.
///
/// Never logged and never stored in clear: stores key sessions by
/// [`SessionId::digest`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// 256 bits from the OS RNG, URL-safe base64 without padding
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Wrap an identifier presented by a client
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex SHA-256 of the identifier, used as the storage key
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

/// Authenticated session for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSession {
    #[serde(skip)]
    id: SessionId,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: PermissionSet,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UserSession {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: SessionId,
        user_id: i64,
        name: String,
        email: String,
        role: Role,
        permissions: PermissionSet,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            email,
            role,
            permissions,
            issued_at,
            expires_at,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Lifecycle position of a presented session identifier.
///
/// `Authenticating` is the span of an `authenticate` call and is never
/// observed from outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Anonymous,
    Authenticated,
    Expired,
    LoggedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn generated_ids_are_url_safe_and_unique() {
        let first = SessionId::generate();
        let second = SessionId::generate();

        assert_ne!(first, second);
        // 32 bytes => 43 unpadded base64 characters
        assert_eq!(first.as_str().len(), 43);
        assert!(first
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn digest_is_stable_hex_and_debug_is_redacted() {
        let id = SessionId::from_token("abc");
        assert_eq!(
            id.digest(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(format!("{:?}", id), "SessionId(<redacted>)");
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let session = UserSession::new(
            SessionId::generate(),
            1,
            "Ada".into(),
            "ada@example.com".into(),
            Role::User,
            PermissionSet::default(),
            now,
            now + Duration::seconds(10),
        );

        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::seconds(10)));
        assert!(!session.is_admin());
    }

    #[test]
    fn serialized_session_omits_identifier() {
        let now = Utc::now();
        let session = UserSession::new(
            SessionId::from_token("secret-token"),
            7,
            "Bo".into(),
            "bo@example.com".into(),
            Role::Admin,
            PermissionSet::parse("dashboard"),
            now,
            now,
        );
        let json = serde_json::to_string(&session).unwrap();
        assert!(!json.contains("secret-token"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
