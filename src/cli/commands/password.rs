use clap::Subcommand;
use serde_json::json;

use crate::auth::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::validation::{validate_password, FieldRule};

#[derive(Subcommand)]
pub enum PasswordCommands {
    #[command(about = "Print a bcrypt hash of a password")]
    Hash {
        #[arg(help = "Plaintext password")]
        password: String,
        #[arg(long, help = "bcrypt cost (defaults to the configured cost)")]
        cost: Option<u32>,
    },

    #[command(about = "Check a password against the configured strength rules")]
    Check {
        #[arg(help = "Plaintext password")]
        password: String,
    },
}

pub async fn handle(cmd: PasswordCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    match cmd {
        PasswordCommands::Hash { password, cost } => {
            let cost = cost.unwrap_or(config.security.bcrypt_cost);
            let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost)).await??;
            match output_format {
                OutputFormat::Json => output_success(
                    &output_format,
                    "Password hashed",
                    Some(json!({ "hash": hash, "cost": cost })),
                ),
                OutputFormat::Text => {
                    println!("{}", hash);
                    Ok(())
                }
            }
        }
        PasswordCommands::Check { password } => {
            let rule = FieldRule::new("password", config.validation.password_constraints());
            validate_password(Some(password.as_str()), &rule)?;
            output_success(&output_format, "Password meets the policy", None)
        }
    }
}
