use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use super::error::{FieldError, ValidationError};
use super::result::NormalizedValue;
use super::rules::ValidationRule;

/// Every field error from one form submission, in rule order
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct FormErrors {
    errors: Vec<ValidationError>,
}

impl FormErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    /// First message per field, as rendered next to form inputs
    pub fn field_messages(&self) -> HashMap<String, String> {
        let mut messages = HashMap::new();
        for error in &self.errors {
            messages
                .entry(error.field().to_string())
                .or_insert_with(|| error.to_string());
        }
        messages
    }

    pub fn field_errors(&self) -> Vec<FieldError> {
        self.errors.iter().map(FieldError::from).collect()
    }
}

impl From<ValidationError> for FormErrors {
    fn from(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }
}

impl FromIterator<ValidationError> for FormErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Normalized values of a form that passed validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedForm {
    values: BTreeMap<String, NormalizedValue>,
}

impl ValidatedForm {
    pub fn get(&self, field: &str) -> Option<&NormalizedValue> {
        self.values.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(NormalizedValue::as_text)
    }

    pub fn into_values(self) -> BTreeMap<String, NormalizedValue> {
        self.values
    }
}

/// An ordered rule set applied to a whole form
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    rules: Vec<ValidationRule>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: impl Into<ValidationRule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    /// Validate every rule, collecting all failures instead of stopping at the first
    pub fn validate<F>(&self, lookup: F) -> Result<ValidatedForm, FormErrors>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        let mut errors = Vec::new();

        for rule in &self.rules {
            let raw = lookup(rule.field());
            match rule.validate(raw.as_deref()).into_result() {
                Ok(value) => {
                    values.insert(rule.field().to_string(), value);
                }
                Err(field_errors) => errors.extend(field_errors),
            }
        }

        if errors.is_empty() {
            Ok(ValidatedForm { values })
        } else {
            Err(FormErrors { errors })
        }
    }

    pub fn validate_map(&self, fields: &HashMap<String, String>) -> Result<ValidatedForm, FormErrors> {
        self.validate(|field| fields.get(field).cloned())
    }
}

impl From<Vec<ValidationRule>> for FormValidator {
    fn from(rules: Vec<ValidationRule>) -> Self {
        Self { rules }
    }
}

/// Apply `rules` to a field map
pub fn validate_form(
    rules: &[ValidationRule],
    fields: &HashMap<String, String>,
) -> Result<ValidatedForm, FormErrors> {
    FormValidator::from(rules.to_vec()).validate_map(fields)
}
