use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::cli::OutputFormat;
use crate::database::DatabaseError;
use crate::services::AccountError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data) = data {
                response["data"] = data;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(fields)) = data {
                for (key, value) in fields {
                    match value {
                        Value::String(s) => println!("  {}: {}", key, s),
                        other => println!("  {}: {}", key, other),
                    }
                }
            }
        }
    }
    Ok(())
}

/// Report a failed command; JSON output carries a stable code when one is known
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error: &anyhow::Error,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });
            if let Some(code) = error_code(error) {
                response["error_code"] = json!(code);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => eprintln!("Error: {}", message),
    }
    Ok(())
}

fn error_code(error: &anyhow::Error) -> Option<&'static str> {
    if let Some(err) = error.downcast_ref::<AccountError>() {
        return Some(match err {
            AccountError::Validation(_) => "VALIDATION_ERROR",
            AccountError::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            AccountError::NotFound(_) => "NOT_FOUND",
            AccountError::Auth(_) => "HASHING_FAILED",
            AccountError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        });
    }
    if error.downcast_ref::<AuthError>().is_some() {
        return Some("AUTH_ERROR");
    }
    if error.downcast_ref::<DatabaseError>().is_some() {
        return Some("DATABASE_ERROR");
    }
    None
}
