//! Input validation for raw form values.
//!
//! Validators are pure: they never persist or render, and the same value and
//! rule always produce the same result. Rules are tagged per kind
//! ([`ValidationRule`]) so each kind only carries constraints that mean
//! something for it.

pub mod error;
pub mod form;
pub mod result;
pub mod rules;
pub mod sanitize;
pub mod validator;

pub use error::{FieldError, ValidationError, ValidationErrorKind};
pub use form::{validate_form, FormErrors, FormValidator, ValidatedForm};
pub use result::{NormalizedValue, ValidationResult};
pub use rules::{
    ChoiceConstraints, DateConstraints, DecimalConstraints, EmailConstraints, ExcessPrecision,
    FieldRule, IntegerConstraints, NameConstraints, PasswordConstraints, PhoneConstraints,
    StringConstraints, ValidationRule,
};
pub use validator::{
    validate_choice, validate_date, validate_decimal, validate_email, validate_integer,
    validate_name, validate_password, validate_phone, validate_string, FieldResult,
};
