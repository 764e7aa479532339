use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One field check: the field it applies to, whether a value must be present,
/// and the constraints of the validation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: Deserialize<'de> + Default"
))]
pub struct FieldRule<C> {
    pub field: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub constraints: C,
}

fn default_required() -> bool {
    true
}

impl<C> FieldRule<C> {
    /// A required rule for `field`
    pub fn new(field: impl Into<String>, constraints: C) -> Self {
        Self {
            field: field.into(),
            required: true,
            constraints,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

impl<C: Default> FieldRule<C> {
    pub fn with_defaults(field: impl Into<String>) -> Self {
        Self::new(field, C::default())
    }
}

/// A validation rule tagged by kind. JSON form:
/// `{"kind": "email", "field": "email", "required": true, "constraints": {}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    String(FieldRule<StringConstraints>),
    Integer(FieldRule<IntegerConstraints>),
    Decimal(FieldRule<DecimalConstraints>),
    Email(FieldRule<EmailConstraints>),
    Phone(FieldRule<PhoneConstraints>),
    Name(FieldRule<NameConstraints>),
    Password(FieldRule<PasswordConstraints>),
    Date(FieldRule<DateConstraints>),
    Choice(FieldRule<ChoiceConstraints>),
}

macro_rules! rule_variants {
    ($($variant:ident => $constraints:ty),* $(,)?) => {
        impl ValidationRule {
            pub fn field(&self) -> &str {
                match self {
                    $(ValidationRule::$variant(rule) => &rule.field,)*
                }
            }

            pub fn required(&self) -> bool {
                match self {
                    $(ValidationRule::$variant(rule) => rule.required,)*
                }
            }
        }

        $(
            impl From<FieldRule<$constraints>> for ValidationRule {
                fn from(rule: FieldRule<$constraints>) -> Self {
                    ValidationRule::$variant(rule)
                }
            }
        )*
    };
}

rule_variants! {
    String => StringConstraints,
    Integer => IntegerConstraints,
    Decimal => DecimalConstraints,
    Email => EmailConstraints,
    Phone => PhoneConstraints,
    Name => NameConstraints,
    Password => PasswordConstraints,
    Date => DateConstraints,
    Choice => ChoiceConstraints,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringConstraints {
    pub min_length: usize,
    pub max_length: usize,
    /// Regex the trimmed value must match
    pub pattern: Option<String>,
}

impl Default for StringConstraints {
    fn default() -> Self {
        Self {
            min_length: 1,
            max_length: 255,
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegerConstraints {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// What to do with fractional digits beyond the allowed scale
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcessPrecision {
    /// Round half away from zero
    Round,
    #[default]
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimalConstraints {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub decimal_places: u32,
    pub excess_precision: ExcessPrecision,
}

impl Default for DecimalConstraints {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            decimal_places: 2,
            excess_precision: ExcessPrecision::Reject,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConstraints {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for EmailConstraints {
    fn default() -> Self {
        Self {
            min_length: 5,
            max_length: 254,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConstraints {
    pub min_digits: usize,
    pub max_digits: usize,
}

impl Default for PhoneConstraints {
    fn default() -> Self {
        Self {
            min_digits: 7,
            max_digits: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConstraints {
    pub max_length: usize,
    pub title_case: bool,
}

impl Default for NameConstraints {
    fn default() -> Self {
        Self {
            max_length: 100,
            title_case: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConstraints {
    pub min_length: usize,
    pub require_special: bool,
    pub require_mixed_case: bool,
    /// Reject passwords found on the common-password list
    pub reject_common: bool,
    /// When off, only presence and the hashing byte limit are checked
    pub enforce_strength: bool,
}

impl PasswordConstraints {
    /// Acceptance checks shared by every password entry point, without strength rules
    pub fn acceptance_only() -> Self {
        Self {
            min_length: 0,
            require_special: false,
            require_mixed_case: false,
            reject_common: false,
            enforce_strength: false,
        }
    }
}

impl Default for PasswordConstraints {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_special: false,
            require_mixed_case: false,
            reject_common: true,
            enforce_strength: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConstraints {
    /// chrono `strftime` format
    pub format: String,
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
}

impl Default for DateConstraints {
    fn default() -> Self {
        Self {
            format: "%Y-%m-%d".to_string(),
            min: None,
            max: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceConstraints {
    pub choices: BTreeSet<String>,
}

impl ChoiceConstraints {
    pub fn of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_tagged_rule_with_defaults() {
        let rule: ValidationRule = serde_json::from_value(json!({
            "kind": "email",
            "field": "email"
        }))
        .unwrap();

        assert_eq!(rule.field(), "email");
        assert!(rule.required());
        match rule {
            ValidationRule::Email(r) => assert_eq!(r.constraints, EmailConstraints::default()),
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn deserializes_partial_constraints() {
        let rule: ValidationRule = serde_json::from_value(json!({
            "kind": "decimal",
            "field": "price",
            "required": false,
            "constraints": { "min": "0", "excess_precision": "round" }
        }))
        .unwrap();

        assert!(!rule.required());
        match rule {
            ValidationRule::Decimal(r) => {
                assert_eq!(r.constraints.decimal_places, 2);
                assert_eq!(r.constraints.excess_precision, ExcessPrecision::Round);
                assert_eq!(r.constraints.min, Some(Decimal::ZERO));
            }
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let result = serde_json::from_value::<ValidationRule>(json!({
            "kind": "colour",
            "field": "x"
        }));
        assert!(result.is_err());
    }
}
