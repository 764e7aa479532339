use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use std::sync::Mutex;

use crate::auth::{
    hash_password, CredentialRecord, CredentialStore, InMemoryCredentialStore, NewCredential,
    PermissionSet, Role,
};

/// Cheapest bcrypt cost; keeps hashing tests fast
pub const TEST_BCRYPT_COST: u32 = 4;

/// Clock that only moves when told to
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *self.0.lock().unwrap() += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Insert an account with a real bcrypt hash of `password`
pub async fn seed_account(
    store: &InMemoryCredentialStore,
    email: &str,
    password: &str,
    role: Role,
    permissions: &str,
) -> CredentialRecord {
    store
        .create_credential(NewCredential {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(password, TEST_BCRYPT_COST).unwrap(),
            role,
            permissions: PermissionSet::parse(permissions),
        })
        .await
        .unwrap()
}
