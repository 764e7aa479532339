use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use std::sync::Arc;

use crate::auth::{CredentialRecord, PasswordHasher, Role};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgCredentialStore, PgSessionStore};
use crate::services::{AccountError, AccountService, Registration};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Register a new account")]
    Create {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Plaintext password")]
        password: String,
        #[arg(long, default_value = "user", help = "Role: admin or user")]
        role: Role,
    },

    #[command(about = "Switch an account between admin and user")]
    ToggleAdmin {
        #[arg(help = "Account id")]
        id: i64,
    },

    #[command(about = "Delete an account and revoke its sessions")]
    Delete {
        #[arg(help = "Account id")]
        id: i64,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let database = DatabaseManager::connect(&config.database)
        .context("user commands need DATABASE_URL")?;

    let result = run(cmd, &config, &database, output_format).await;
    database.close().await;
    result
}

async fn run(
    cmd: UserCommands,
    config: &AppConfig,
    database: &DatabaseManager,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    database.ensure_schema().await?;
    let accounts = AccountService::new(
        Arc::new(PgCredentialStore::new(database.pool().clone())),
        Arc::new(PgSessionStore::new(database.pool().clone())),
        PasswordHasher::new(config.security.bcrypt_cost)?,
        &config.validation,
    );

    match cmd {
        UserCommands::Create {
            name,
            email,
            password,
            role,
        } => {
            let registration = Registration {
                name: Some(name),
                email: Some(email),
                password: Some(password),
            };
            let record = accounts
                .register(&registration, role)
                .await
                .map_err(describe_account_error)?;
            output_success(
                &output_format,
                &format!("Created {} account {}", record.role, record.email),
                Some(account_json(&record)),
            )
        }
        UserCommands::ToggleAdmin { id } => {
            let record = accounts.toggle_admin(id).await.map_err(describe_account_error)?;
            output_success(
                &output_format,
                &format!("Account {} is now {}", record.email, record.role),
                Some(account_json(&record)),
            )
        }
        UserCommands::Delete { id } => {
            accounts.delete_account(id).await.map_err(describe_account_error)?;
            output_success(&output_format, &format!("Deleted account {}", id), None)
        }
    }
}

fn account_json(record: &CredentialRecord) -> serde_json::Value {
    json!({
        "id": record.user_id,
        "name": record.name,
        "email": record.email,
        "role": record.role,
        "permissions": record.permissions.to_stored(),
    })
}

/// Spell out every field failure instead of just the count, keeping the
/// typed error underneath for the reported code
fn describe_account_error(err: AccountError) -> anyhow::Error {
    let detail = match &err {
        AccountError::Validation(errors) => errors
            .errors()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    };
    anyhow::Error::new(err).context(detail)
}
