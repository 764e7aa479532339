use serde::Serialize;
use thiserror::Error;

/// Field-scoped validation failure. Always recoverable by re-prompting the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: String,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("{field} must be a valid {expected}")]
    Type { field: String, expected: &'static str },

    #[error("{field} {detail}")]
    Range { field: String, detail: String },

    #[error("{field} {detail}")]
    Format { field: String, detail: String },

    #[error("{field} must be one of: {}", .allowed.join(", "))]
    Choice { field: String, allowed: Vec<String> },

    #[error("{field} {detail}")]
    Weakness { field: String, detail: String },

    #[error("{field} has an invalid rule: {detail}")]
    InvalidRule { field: String, detail: String },
}

/// Stable, serializable discriminant of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    Required,
    Length,
    Type,
    Range,
    Format,
    Choice,
    Weakness,
    InvalidRule,
}

impl ValidationError {
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::Length { field, .. }
            | ValidationError::Type { field, .. }
            | ValidationError::Range { field, .. }
            | ValidationError::Format { field, .. }
            | ValidationError::Choice { field, .. }
            | ValidationError::Weakness { field, .. }
            | ValidationError::InvalidRule { field, .. } => field,
        }
    }

    pub fn kind(&self) -> ValidationErrorKind {
        match self {
            ValidationError::Required { .. } => ValidationErrorKind::Required,
            ValidationError::Length { .. } => ValidationErrorKind::Length,
            ValidationError::Type { .. } => ValidationErrorKind::Type,
            ValidationError::Range { .. } => ValidationErrorKind::Range,
            ValidationError::Format { .. } => ValidationErrorKind::Format,
            ValidationError::Choice { .. } => ValidationErrorKind::Choice,
            ValidationError::Weakness { .. } => ValidationErrorKind::Weakness,
            ValidationError::InvalidRule { .. } => ValidationErrorKind::InvalidRule,
        }
    }

    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required { field: field.to_string() }
    }

    pub(crate) fn range(field: &str, detail: impl Into<String>) -> Self {
        ValidationError::Range { field: field.to_string(), detail: detail.into() }
    }

    pub(crate) fn format(field: &str, detail: impl Into<String>) -> Self {
        ValidationError::Format { field: field.to_string(), detail: detail.into() }
    }

    pub(crate) fn weakness(field: &str, detail: impl Into<String>) -> Self {
        ValidationError::Weakness { field: field.to_string(), detail: detail.into() }
    }
}

/// Serializable view of one field error, as sent back to the client
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(err: &ValidationError) -> Self {
        Self {
            field: err.field().to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
