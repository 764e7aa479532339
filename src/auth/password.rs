use super::error::AuthError;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// bcrypt ignores every byte past this point
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash `plaintext` with bcrypt at the given cost
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, AuthError> {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Hashing(format!(
            "password exceeds {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    bcrypt::hash(plaintext, cost).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Check `plaintext` against a stored bcrypt hash. Malformed hashes and
/// passwords too long to have been hashed never match.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    if plaintext.len() > MAX_PASSWORD_BYTES {
        return false;
    }
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Runs bcrypt on the blocking thread pool so request tasks are not stalled
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Hashing(format!(
                "bcrypt cost must be between {MIN_COST} and {MAX_COST}, got {cost}"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let plaintext = plaintext.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_password(&plaintext, cost))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    pub async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }
}
