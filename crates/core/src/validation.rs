//! Input validation utilities.
//!
//! Turns loosely typed create-request fields into validated values. Messages are user facing:
//! they are returned verbatim to API clients and shown next to the submitted form.

use crate::constants::{MAX_AGE, MIN_AGE};
use crate::patient::AgeInput;
use crate::{PatientError, PatientResult};
use hpr_types::{NonEmptyText, TextError};

/// Returns the field's text if it is present and not blank.
///
/// # Errors
///
/// Returns `PatientError::Validation` naming the field if it is absent or whitespace only.
pub(crate) fn require_text<'a>(field: &str, value: Option<&'a str>) -> PatientResult<&'a str> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(PatientError::missing_field(field)),
    }
}

/// Returns the age input if it is present and not a blank string.
pub(crate) fn require_age<'a>(value: Option<&'a AgeInput>) -> PatientResult<&'a AgeInput> {
    match value {
        Some(AgeInput::Text(t)) if t.trim().is_empty() => Err(PatientError::missing_field("age")),
        Some(age) => Ok(age),
        None => Err(PatientError::missing_field("age")),
    }
}

/// Trims `value` and checks it against a character limit.
pub(crate) fn bounded_text(field: &str, value: &str, max_chars: usize) -> PatientResult<NonEmptyText> {
    NonEmptyText::bounded(value, max_chars).map_err(|e| match e {
        TextError::Empty => PatientError::missing_field(field),
        TextError::TooLong { max } => {
            PatientError::Validation(format!("{field} must be at most {max} characters"))
        }
    })
}

/// Parses an age in whole years and checks it is within `MIN_AGE..=MAX_AGE`.
///
/// Text input must be an integer (surrounding whitespace allowed, as a form field would send
/// it).
pub(crate) fn parse_age(value: &AgeInput) -> PatientResult<u8> {
    let years = match value {
        AgeInput::Years(n) => *n,
        AgeInput::Text(t) => t.trim().parse::<i64>().map_err(|_| {
            PatientError::Validation("Invalid age value. Age must be a number".into())
        })?,
    };

    if years < i64::from(MIN_AGE) || years > i64::from(MAX_AGE) {
        return Err(PatientError::Validation(format!(
            "Age must be between {MIN_AGE} and {MAX_AGE}"
        )));
    }

    // In range, so the narrowing cannot fail.
    u8::try_from(years).map_err(|_| {
        PatientError::Validation(format!("Age must be between {MIN_AGE} and {MAX_AGE}"))
    })
}
