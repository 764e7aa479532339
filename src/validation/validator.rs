//! Per-kind field validators.
//!
//! Every validator trims its input first. An absent or blank value is "not
//! provided": it fails with [`ValidationError::Required`] for required rules and
//! otherwise yields `Ok(None)` without reaching any numeric, date or format check.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::error::ValidationError;
use super::rules::{
    ChoiceConstraints, DateConstraints, DecimalConstraints, EmailConstraints, ExcessPrecision,
    FieldRule, IntegerConstraints, NameConstraints, PasswordConstraints, PhoneConstraints,
    StringConstraints,
};
use super::sanitize::{escape_html, has_forbidden_control};
use crate::auth::MAX_PASSWORD_BYTES;

pub type FieldResult<T> = Result<Option<T>, ValidationError>;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("valid regex")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()\-]+$").expect("valid regex"));

/// Passwords rejected outright, compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "passw0rd", "123456", "12345678", "123456789",
    "1234567890", "qwerty", "qwerty123", "abc123", "abcd1234", "admin", "admin123", "letmein",
    "welcome", "welcome1", "monkey", "iloveyou", "princess", "rockyou", "football", "baseball",
    "dragon", "sunshine", "trustno1",
];

fn presence<'a>(value: Option<&'a str>, field: &str, required: bool) -> FieldResult<&'a str> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Ok(Some(v)),
        None if required => Err(ValidationError::required(field)),
        None => Ok(None),
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual < min || actual > max {
        return Err(ValidationError::Length {
            field: field.to_string(),
            min,
            max,
            actual,
        });
    }
    Ok(())
}

/// Length-checked, HTML-escaped free text
pub fn validate_string(value: Option<&str>, rule: &FieldRule<StringConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };
    let constraints = &rule.constraints;

    check_length(field, value, constraints.min_length, constraints.max_length)?;

    if has_forbidden_control(value) {
        return Err(ValidationError::format(field, "contains control characters"));
    }

    if let Some(pattern) = &constraints.pattern {
        let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidRule {
            field: field.to_string(),
            detail: e.to_string(),
        })?;
        if !regex.is_match(value) {
            return Err(ValidationError::format(field, "has invalid format"));
        }
    }

    Ok(Some(escape_html(value)))
}

pub fn validate_integer(value: Option<&str>, rule: &FieldRule<IntegerConstraints>) -> FieldResult<i64> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };

    let parsed: i64 = value.parse().map_err(|_| ValidationError::Type {
        field: field.to_string(),
        expected: "integer",
    })?;

    if let Some(min) = rule.constraints.min {
        if parsed < min {
            return Err(ValidationError::range(field, format!("must be at least {}", min)));
        }
    }
    if let Some(max) = rule.constraints.max {
        if parsed > max {
            return Err(ValidationError::range(field, format!("cannot exceed {}", max)));
        }
    }

    Ok(Some(parsed))
}

pub fn validate_decimal(value: Option<&str>, rule: &FieldRule<DecimalConstraints>) -> FieldResult<Decimal> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };
    let constraints = &rule.constraints;

    let mut parsed = Decimal::from_str(value).map_err(|_| ValidationError::Type {
        field: field.to_string(),
        expected: "number",
    })?;

    if parsed.scale() > constraints.decimal_places {
        match constraints.excess_precision {
            ExcessPrecision::Round => {
                parsed = parsed.round_dp_with_strategy(
                    constraints.decimal_places,
                    RoundingStrategy::MidpointAwayFromZero,
                );
            }
            ExcessPrecision::Reject => {
                return Err(ValidationError::format(
                    field,
                    format!("cannot have more than {} decimal places", constraints.decimal_places),
                ));
            }
        }
    }

    if let Some(min) = constraints.min {
        if parsed < min {
            return Err(ValidationError::range(field, format!("must be at least {}", min)));
        }
    }
    if let Some(max) = constraints.max {
        if parsed > max {
            return Err(ValidationError::range(field, format!("cannot exceed {}", max)));
        }
    }

    Ok(Some(parsed))
}

/// Lower-cased email address
pub fn validate_email(value: Option<&str>, rule: &FieldRule<EmailConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };

    check_length(field, value, rule.constraints.min_length, rule.constraints.max_length)?;

    let lowered = value.to_lowercase();
    if !EMAIL_PATTERN.is_match(&lowered) {
        return Err(ValidationError::format(field, "has invalid format"));
    }

    Ok(Some(lowered))
}

pub fn validate_phone(value: Option<&str>, rule: &FieldRule<PhoneConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };

    if !PHONE_PATTERN.is_match(value) {
        return Err(ValidationError::format(
            field,
            "may only contain digits, spaces, hyphens, parentheses and a leading +",
        ));
    }

    let digits = value.chars().filter(char::is_ascii_digit).count();
    let (min_digits, max_digits) = (rule.constraints.min_digits, rule.constraints.max_digits);
    if digits < min_digits || digits > max_digits {
        return Err(ValidationError::format(
            field,
            format!("must contain between {} and {} digits", min_digits, max_digits),
        ));
    }

    Ok(Some(value.to_string()))
}

/// Person or company name: letters, spaces, hyphens and apostrophes
pub fn validate_name(value: Option<&str>, rule: &FieldRule<NameConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };

    check_length(field, value, 1, rule.constraints.max_length)?;

    if !value.chars().all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'')) {
        return Err(ValidationError::format(
            field,
            "can only contain letters, spaces, hyphens and apostrophes",
        ));
    }

    if rule.constraints.title_case {
        Ok(Some(title_case(value)))
    } else {
        Ok(Some(value.to_string()))
    }
}

/// Upper-case each letter that follows a non-letter, lower-case the rest
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Strength check. The password is returned untouched: it is hashed, never rendered.
///
/// Presence is judged on the raw value and the byte limit always applies, so a
/// password accepted here can always be submitted again at login.
pub fn validate_password(value: Option<&str>, rule: &FieldRule<PasswordConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return if rule.required {
            Err(ValidationError::required(field))
        } else {
            Ok(None)
        };
    };
    if value.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::weakness(
            field,
            format!("must be at most {MAX_PASSWORD_BYTES} bytes long"),
        ));
    }
    let constraints = &rule.constraints;
    if !constraints.enforce_strength {
        return Ok(Some(value.to_string()));
    }

    if value.chars().count() < constraints.min_length {
        return Err(ValidationError::weakness(
            field,
            format!("must be at least {} characters long", constraints.min_length),
        ));
    }
    if !value.chars().any(char::is_alphabetic) {
        return Err(ValidationError::weakness(field, "must contain at least one letter"));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::weakness(field, "must contain at least one digit"));
    }
    if constraints.require_mixed_case
        && !(value.chars().any(char::is_lowercase) && value.chars().any(char::is_uppercase))
    {
        return Err(ValidationError::weakness(
            field,
            "must contain both uppercase and lowercase letters",
        ));
    }
    if constraints.require_special && !value.chars().any(|c| c.is_ascii_punctuation()) {
        return Err(ValidationError::weakness(
            field,
            "must contain at least one special character",
        ));
    }
    if constraints.reject_common {
        let lowered = value.to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            return Err(ValidationError::weakness(field, "is too common"));
        }
    }

    Ok(Some(value.to_string()))
}

pub fn validate_date(value: Option<&str>, rule: &FieldRule<DateConstraints>) -> FieldResult<NaiveDate> {
    let field = rule.field.as_str();
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };
    let constraints = &rule.constraints;

    let date = NaiveDate::parse_from_str(value, &constraints.format).map_err(|_| {
        ValidationError::format(field, format!("must be in format {}", constraints.format))
    })?;

    if let Some(min) = constraints.min {
        if date < min {
            return Err(ValidationError::range(field, format!("cannot be before {}", min)));
        }
    }
    if let Some(max) = constraints.max {
        if date > max {
            return Err(ValidationError::range(field, format!("cannot be after {}", max)));
        }
    }

    Ok(Some(date))
}

pub fn validate_choice(value: Option<&str>, rule: &FieldRule<ChoiceConstraints>) -> FieldResult<String> {
    let field = rule.field.as_str();
    if rule.constraints.choices.is_empty() {
        return Err(ValidationError::InvalidRule {
            field: field.to_string(),
            detail: "no choices configured".to_string(),
        });
    }
    let Some(value) = presence(value, field, rule.required)? else {
        return Ok(None);
    };

    if !rule.constraints.choices.contains(value) {
        return Err(ValidationError::Choice {
            field: field.to_string(),
            allowed: rule.constraints.choices.iter().cloned().collect(),
        });
    }

    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;
    use rstest::rstest;

    fn string_rule(min: usize, max: usize) -> FieldRule<StringConstraints> {
        FieldRule::new(
            "notes",
            StringConstraints {
                min_length: min,
                max_length: max,
                pattern: None,
            },
        )
    }

    fn kind<T: std::fmt::Debug>(result: FieldResult<T>) -> ValidationErrorKind {
        result.expect_err("validation should fail").kind()
    }

    #[test]
    fn string_within_bounds_is_escaped() {
        let rule = string_rule(1, 40);
        let value = validate_string(Some("Fish & <Chips>"), &rule).unwrap();
        assert_eq!(value.as_deref(), Some("Fish &amp; &lt;Chips&gt;"));
    }

    #[test]
    fn string_length_is_measured_before_escaping() {
        // 5 characters, 13 once escaped
        let rule = string_rule(1, 5);
        assert!(validate_string(Some("<a&b>"), &rule).is_ok());
    }

    #[rstest]
    #[case("ab")]
    #[case("abcdefghijk")]
    fn string_outside_bounds_fails_with_length(#[case] input: &str) {
        let rule = string_rule(3, 10);
        assert_eq!(kind(validate_string(Some(input), &rule)), ValidationErrorKind::Length);
    }

    #[test]
    fn string_required_and_optional_blank() {
        let rule = string_rule(1, 10);
        assert_eq!(kind(validate_string(None, &rule)), ValidationErrorKind::Required);
        assert_eq!(kind(validate_string(Some("   "), &rule)), ValidationErrorKind::Required);
        assert_eq!(validate_string(Some(""), &rule.clone().optional()).unwrap(), None);
    }

    #[test]
    fn string_pattern_and_control_characters() {
        let mut rule = string_rule(1, 20);
        rule.constraints.pattern = Some(r"^INV-\d+$".to_string());
        assert_eq!(validate_string(Some("INV-1001"), &rule).unwrap().as_deref(), Some("INV-1001"));
        assert_eq!(kind(validate_string(Some("QUO-1"), &rule)), ValidationErrorKind::Format);

        rule.constraints.pattern = Some("(".to_string());
        assert_eq!(kind(validate_string(Some("x"), &rule)), ValidationErrorKind::InvalidRule);

        let plain = string_rule(1, 20);
        assert_eq!(kind(validate_string(Some("bell\u{7}"), &plain)), ValidationErrorKind::Format);
    }

    #[test]
    fn integer_parsing_and_range() {
        let rule = FieldRule::new("quantity", IntegerConstraints { min: Some(1), max: Some(100) });
        assert_eq!(validate_integer(Some(" 42 "), &rule).unwrap(), Some(42));
        assert_eq!(kind(validate_integer(Some("4.2"), &rule)), ValidationErrorKind::Type);
        assert_eq!(kind(validate_integer(Some("0"), &rule)), ValidationErrorKind::Range);
        assert_eq!(kind(validate_integer(Some("101"), &rule)), ValidationErrorKind::Range);
        assert_eq!(validate_integer(Some(""), &rule.optional()).unwrap(), None);
    }

    #[test]
    fn decimal_precision_policies() {
        let mut rule = FieldRule::new(
            "price",
            DecimalConstraints {
                min: Some(Decimal::ZERO),
                ..Default::default()
            },
        );
        assert_eq!(
            validate_decimal(Some("19.99"), &rule).unwrap(),
            Some(Decimal::new(1999, 2))
        );
        assert_eq!(kind(validate_decimal(Some("19.999"), &rule)), ValidationErrorKind::Format);
        assert_eq!(kind(validate_decimal(Some("abc"), &rule)), ValidationErrorKind::Type);
        assert_eq!(kind(validate_decimal(Some("-1"), &rule)), ValidationErrorKind::Range);

        rule.constraints.excess_precision = ExcessPrecision::Round;
        assert_eq!(
            validate_decimal(Some("19.995"), &rule).unwrap(),
            Some(Decimal::new(2000, 2))
        );
    }

    #[rstest]
    #[case("user@example.com", "user@example.com")]
    #[case("  Jane.Doe+turf@Golden-Turf.co.uk ", "jane.doe+turf@golden-turf.co.uk")]
    fn email_accepts_and_lowercases(#[case] input: &str, #[case] expected: &str) {
        let rule = FieldRule::<EmailConstraints>::with_defaults("email");
        assert_eq!(validate_email(Some(input), &rule).unwrap().as_deref(), Some(expected));
    }

    #[rstest]
    #[case("not-an-email")]
    #[case("user@localhost")]
    #[case("us er@example.com")]
    #[case("user@@example.com")]
    fn email_rejects_bad_format(#[case] input: &str) {
        let rule = FieldRule::<EmailConstraints>::with_defaults("email");
        assert_eq!(kind(validate_email(Some(input), &rule)), ValidationErrorKind::Format);
    }

    #[rstest]
    #[case("+44 20 7946 0958")]
    #[case("(555) 123-4567")]
    #[case("5551234")]
    fn phone_accepts_plausible_numbers(#[case] input: &str) {
        let rule = FieldRule::<PhoneConstraints>::with_defaults("phone");
        assert_eq!(validate_phone(Some(input), &rule).unwrap().as_deref(), Some(input));
    }

    #[rstest]
    #[case("123456")]
    #[case("1234567890123456")]
    #[case("555-CALL-NOW")]
    #[case("12+3456789")]
    fn phone_rejects_implausible_numbers(#[case] input: &str) {
        let rule = FieldRule::<PhoneConstraints>::with_defaults("phone");
        assert_eq!(kind(validate_phone(Some(input), &rule)), ValidationErrorKind::Format);
    }

    #[test]
    fn name_title_cases_and_rejects_symbols() {
        let rule = FieldRule::<NameConstraints>::with_defaults("name");
        assert_eq!(
            validate_name(Some("mary-jane o'neil"), &rule).unwrap().as_deref(),
            Some("Mary-Jane O'Neil")
        );
        assert_eq!(kind(validate_name(Some("R2-D2"), &rule)), ValidationErrorKind::Format);
        assert_eq!(kind(validate_name(Some("<script>"), &rule)), ValidationErrorKind::Format);
    }

    #[test]
    fn password_strength_rules() {
        let rule = FieldRule::new(
            "password",
            PasswordConstraints {
                min_length: 8,
                ..Default::default()
            },
        );
        assert_eq!(kind(validate_password(Some("abc"), &rule)), ValidationErrorKind::Weakness);
        assert_eq!(kind(validate_password(Some("abcdefgh"), &rule)), ValidationErrorKind::Weakness);
        assert_eq!(kind(validate_password(Some("12345678"), &rule)), ValidationErrorKind::Weakness);
        assert_eq!(kind(validate_password(Some("Password1"), &rule)), ValidationErrorKind::Weakness);
        assert_eq!(kind(validate_password(None, &rule)), ValidationErrorKind::Required);

        let strict = FieldRule::new(
            "password",
            PasswordConstraints {
                min_length: 8,
                require_special: true,
                ..Default::default()
            },
        );
        assert_eq!(
            validate_password(Some("Abc12345!"), &strict).unwrap().as_deref(),
            Some("Abc12345!")
        );
        assert_eq!(kind(validate_password(Some("Abc123456"), &strict)), ValidationErrorKind::Weakness);
    }

    #[test]
    fn password_longer_than_bcrypt_input_is_rejected() {
        let rule = FieldRule::<PasswordConstraints>::with_defaults("password");
        let at_limit = format!("Ab1{}", "x".repeat(MAX_PASSWORD_BYTES - 3));
        assert!(validate_password(Some(&at_limit), &rule).is_ok());
        assert_eq!(
            kind(validate_password(Some(&format!("{at_limit}z")), &rule)),
            ValidationErrorKind::Weakness
        );
    }

    #[test]
    fn acceptance_only_keeps_raw_value_and_byte_limit() {
        let rule = FieldRule::new("password", PasswordConstraints::acceptance_only());
        assert_eq!(validate_password(Some(" x\u{1} "), &rule).unwrap().as_deref(), Some(" x\u{1} "));
        assert_eq!(kind(validate_password(Some(""), &rule)), ValidationErrorKind::Required);
        assert_eq!(
            kind(validate_password(Some(&"a".repeat(MAX_PASSWORD_BYTES + 1)), &rule)),
            ValidationErrorKind::Weakness
        );
    }

    #[test]
    fn date_format_and_window() {
        let rule = FieldRule::new(
            "due_date",
            DateConstraints {
                min: NaiveDate::from_ymd_opt(2024, 1, 1),
                max: NaiveDate::from_ymd_opt(2024, 12, 31),
                ..Default::default()
            },
        );
        assert_eq!(
            validate_date(Some("2024-06-30"), &rule).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30)
        );
        assert_eq!(kind(validate_date(Some("30/06/2024"), &rule)), ValidationErrorKind::Format);
        assert_eq!(kind(validate_date(Some("2023-12-31"), &rule)), ValidationErrorKind::Range);
        assert_eq!(kind(validate_date(Some("2025-01-01"), &rule)), ValidationErrorKind::Range);
    }

    #[test]
    fn empty_date_is_not_provided_rather_than_invalid() {
        let rule = FieldRule::<DateConstraints>::with_defaults("due_date");
        assert_eq!(kind(validate_date(Some(""), &rule)), ValidationErrorKind::Required);
        assert_eq!(validate_date(Some(""), &rule.optional()).unwrap(), None);
    }

    #[test]
    fn choice_membership() {
        let rule = FieldRule::new("status", ChoiceConstraints::of(["draft", "sent", "paid"]));
        assert_eq!(validate_choice(Some("paid"), &rule).unwrap().as_deref(), Some("paid"));
        let err = validate_choice(Some("Paid"), &rule).unwrap_err();
        assert_eq!(err.kind(), ValidationErrorKind::Choice);
        assert_eq!(err.to_string(), "status must be one of: draft, paid, sent");
    }
}
