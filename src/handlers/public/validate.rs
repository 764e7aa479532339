// handlers/public/validate.rs - POST /validate handler

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::HashMap;

use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{FormValidator, ValidatedForm, ValidationRule};

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub rules: Vec<ValidationRule>,
    /// `null` means absent. Arrays and objects fail to deserialize.
    #[serde(default)]
    pub values: HashMap<String, Option<ScalarValue>>,
}

/// A JSON scalar as submitted for one field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl ScalarValue {
    /// The raw text a form would have submitted
    fn raw_text(&self) -> String {
        match self {
            ScalarValue::Text(s) => s.clone(),
            ScalarValue::Number(n) => n.to_string(),
            ScalarValue::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub values: ValidatedForm,
}

/// POST /validate - Run a caller-supplied rule set over raw values
///
/// Expected Input:
/// ```json
/// {
///   "rules": [{ "kind": "email", "field": "email" }],
///   "values": { "email": "User@Example.com" }
/// }
/// ```
///
/// Responds with the normalized values, or `422` listing every field error.
pub async fn validate_post(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<ValidateResponse> {
    let Json(request) = payload?;
    let values = FormValidator::from(request.rules)
        .validate(|field| request.values.get(field).and_then(|v| v.as_ref().map(ScalarValue::raw_text)))?;

    Ok(ApiResponse::success(ValidateResponse {
        valid: true,
        values,
    }))
}
