use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::validation::PasswordConstraints;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string; `None` runs against the in-memory stores
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

/// Where live sessions are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Postgres,
}

/// Longest session the server will issue: 30 days
pub const MAX_SESSION_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub enable_audit_logging: bool,
    /// Between 1 and [`MAX_SESSION_LIFETIME_SECS`]
    pub session_lifetime_secs: i64,
    pub session_sweep_interval_secs: u64,
    pub session_backend: SessionBackend,
    pub bcrypt_cost: u32,
    /// Report unknown emails as NotFound instead of InvalidCredentials
    pub reveal_unknown_accounts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub password_min_length: usize,
    pub password_require_special: bool,
    pub password_require_mixed_case: bool,
}

impl ValidationConfig {
    /// Strength rules applied to new passwords
    pub fn password_constraints(&self) -> PasswordConstraints {
        PasswordConstraints {
            min_length: self.password_min_length,
            require_special: self.password_require_special,
            require_mixed_case: self.password_require_mixed_case,
            ..Default::default()
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Some(v) = env::var("GOLDEN_TURF_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|url| !url.trim().is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_AUDIT_LOGGING") {
            self.security.enable_audit_logging = v.parse().unwrap_or(self.security.enable_audit_logging);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_LIFETIME_SECS") {
            match parse_session_lifetime(&v) {
                Some(secs) => self.security.session_lifetime_secs = secs,
                None => warn!(
                    value = %v,
                    max = MAX_SESSION_LIFETIME_SECS,
                    "Ignoring out-of-range SECURITY_SESSION_LIFETIME_SECS"
                ),
            }
        }
        if let Ok(v) = env::var("SECURITY_SESSION_SWEEP_INTERVAL_SECS") {
            self.security.session_sweep_interval_secs =
                v.parse().unwrap_or(self.security.session_sweep_interval_secs);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_BACKEND") {
            self.security.session_backend = match v.to_ascii_lowercase().as_str() {
                "postgres" | "database" => SessionBackend::Postgres,
                "memory" => SessionBackend::Memory,
                _ => self.security.session_backend,
            };
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_REVEAL_UNKNOWN_ACCOUNTS") {
            self.security.reveal_unknown_accounts =
                v.parse().unwrap_or(self.security.reveal_unknown_accounts);
        }

        // Validation overrides
        if let Ok(v) = env::var("PASSWORD_MIN_LENGTH") {
            self.validation.password_min_length = v.parse().unwrap_or(self.validation.password_min_length);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_SPECIAL") {
            self.validation.password_require_special =
                v.parse().unwrap_or(self.validation.password_require_special);
        }
        if let Ok(v) = env::var("PASSWORD_REQUIRE_MIXED_CASE") {
            self.validation.password_require_mixed_case =
                v.parse().unwrap_or(self.validation.password_require_mixed_case);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:5000".to_string()],
                enable_audit_logging: false,
                session_lifetime_secs: 60 * 60, // 1 hour
                session_sweep_interval_secs: 60,
                session_backend: SessionBackend::Memory,
                bcrypt_cost: 10,
                reveal_unknown_accounts: false,
            },
            validation: ValidationConfig {
                password_min_length: 8,
                password_require_special: false,
                password_require_mixed_case: false,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://staging.goldenturf.com".to_string()];
        config.security.enable_audit_logging = true;
        config.security.session_backend = SessionBackend::Postgres;
        config.security.bcrypt_cost = 12;
        config.validation.password_require_special = true;
        config
    }

    fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cors_origins = vec!["https://app.goldenturf.com".to_string()];
        config.security.session_sweep_interval_secs = 300;
        config.validation.password_require_mixed_case = true;
        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Positive whole seconds no longer than [`MAX_SESSION_LIFETIME_SECS`]
fn parse_session_lifetime(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|secs| (1..=MAX_SESSION_LIFETIME_SECS).contains(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert_eq!(config.security.session_backend, SessionBackend::Memory);
        assert_eq!(config.security.session_lifetime_secs, 3600);
        assert!(!config.validation.password_require_special);
    }

    #[test]
    fn test_session_lifetime_bounds() {
        assert_eq!(parse_session_lifetime("900"), Some(900));
        assert_eq!(parse_session_lifetime(" 86400 "), Some(86400));
        assert_eq!(
            parse_session_lifetime(&MAX_SESSION_LIFETIME_SECS.to_string()),
            Some(MAX_SESSION_LIFETIME_SECS)
        );
        assert_eq!(parse_session_lifetime("0"), None);
        assert_eq!(parse_session_lifetime("-60"), None);
        assert_eq!(parse_session_lifetime("1000000000000000"), None);
        assert_eq!(parse_session_lifetime("an hour"), None);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.security.session_backend, SessionBackend::Postgres);
        assert!(config.security.enable_audit_logging);
        assert!(config.validation.password_require_special);
        assert!(config.validation.password_require_mixed_case);
        assert!(!config.security.reveal_unknown_accounts);
    }
}
