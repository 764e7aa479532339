use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ValidationError;
use super::rules::ValidationRule;
use super::validator::{
    validate_choice, validate_date, validate_decimal, validate_email, validate_integer,
    validate_name, validate_password, validate_phone, validate_string,
};

/// Type-erased normalized field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NormalizedValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
    /// Optional field that was not provided
    Absent,
}

impl NormalizedValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NormalizedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, NormalizedValue::Absent)
    }
}

/// Outcome of validating one field. A failed result holds errors and no value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    outcome: Result<NormalizedValue, Vec<ValidationError>>,
}

impl ValidationResult {
    pub fn success(value: NormalizedValue) -> Self {
        Self { outcome: Ok(value) }
    }

    pub fn failure(error: ValidationError) -> Self {
        Self {
            outcome: Err(vec![error]),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&NormalizedValue> {
        self.outcome.as_ref().ok()
    }

    pub fn errors(&self) -> &[ValidationError] {
        match &self.outcome {
            Ok(_) => &[],
            Err(errors) => errors.as_slice(),
        }
    }

    pub fn into_result(self) -> Result<NormalizedValue, Vec<ValidationError>> {
        self.outcome
    }
}

fn erase<T>(result: Result<Option<T>, ValidationError>, wrap: fn(T) -> NormalizedValue) -> ValidationResult {
    match result {
        Ok(Some(value)) => ValidationResult::success(wrap(value)),
        Ok(None) => ValidationResult::success(NormalizedValue::Absent),
        Err(error) => ValidationResult::failure(error),
    }
}

impl ValidationRule {
    /// Dispatch to the validator for this rule's kind
    pub fn validate(&self, value: Option<&str>) -> ValidationResult {
        match self {
            ValidationRule::String(rule) => erase(validate_string(value, rule), NormalizedValue::Text),
            ValidationRule::Integer(rule) => erase(validate_integer(value, rule), NormalizedValue::Integer),
            ValidationRule::Decimal(rule) => erase(validate_decimal(value, rule), NormalizedValue::Decimal),
            ValidationRule::Email(rule) => erase(validate_email(value, rule), NormalizedValue::Text),
            ValidationRule::Phone(rule) => erase(validate_phone(value, rule), NormalizedValue::Text),
            ValidationRule::Name(rule) => erase(validate_name(value, rule), NormalizedValue::Text),
            ValidationRule::Password(rule) => erase(validate_password(value, rule), NormalizedValue::Text),
            ValidationRule::Date(rule) => erase(validate_date(value, rule), NormalizedValue::Date),
            ValidationRule::Choice(rule) => erase(validate_choice(value, rule), NormalizedValue::Text),
        }
    }
}
