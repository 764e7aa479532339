use thiserror::Error;

/// Authentication and authorization failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// Only produced when unknown accounts are explicitly disclosed
    #[error("No account found for {email}")]
    NotFound { email: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Session has expired")]
    ExpiredSession,

    #[error("Permission denied: {permission}")]
    Forbidden { permission: String },

    /// Backing store failure. `detail` is for logs only.
    #[error("Authentication is temporarily unavailable")]
    Unavailable { detail: String },

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid authentication settings: {0}")]
    InvalidSettings(String),
}

impl AuthError {
    pub(crate) fn unavailable(detail: impl std::fmt::Display) -> Self {
        AuthError::Unavailable {
            detail: detail.to_string(),
        }
    }
}
