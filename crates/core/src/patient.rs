//! Patient records and create-request input.
//!
//! A [`Patient`] can only be obtained by validating a [`PatientInput`], so every stored record
//! satisfies the field rules. The hash index is never stored: [`Patient::hash_index`] derives it
//! from the patient ID on demand.

use crate::constants::{
    MAX_DISEASE_CHARS, MAX_DOCTOR_CHARS, MAX_GENDER_CHARS, MAX_NAME_CHARS, MAX_PID_CHARS,
};
use crate::hashing::compute_hash_index;
use crate::validation::{bounded_text, parse_age, require_age, require_text};
use crate::PatientResult;
use hpr_types::NonEmptyText;

/// Age as submitted by a client, before validation.
///
/// Form-driven clients send the age as text while typed clients send a number; both are
/// accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgeInput {
    Years(i64),
    Text(String),
}

impl From<u8> for AgeInput {
    fn from(years: u8) -> Self {
        Self::Years(i64::from(years))
    }
}

/// Unvalidated fields of a create request.
///
/// Every field is optional so that a missing field can be reported by name rather than failing
/// to decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientInput {
    pub pid: Option<String>,
    pub name: Option<String>,
    pub age: Option<AgeInput>,
    pub gender: Option<String>,
    pub disease: Option<String>,
    pub doctor: Option<String>,
}

impl PatientInput {
    /// Builds an input with every field present.
    pub fn new(
        pid: impl Into<String>,
        name: impl Into<String>,
        age: impl Into<AgeInput>,
        gender: impl Into<String>,
        disease: impl Into<String>,
        doctor: impl Into<String>,
    ) -> Self {
        Self {
            pid: Some(pid.into()),
            name: Some(name.into()),
            age: Some(age.into()),
            gender: Some(gender.into()),
            disease: Some(disease.into()),
            doctor: Some(doctor.into()),
        }
    }

    /// Validates the input and produces a [`Patient`].
    ///
    /// Presence of all six fields is checked first, in the order `pid`, `name`, `age`, `gender`,
    /// `disease`, `doctor`; then the age; then the field lengths. Text fields are trimmed.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::Validation` describing the first rule that failed.
    pub fn validate(&self) -> PatientResult<Patient> {
        let pid = require_text("pid", self.pid.as_deref())?;
        let name = require_text("name", self.name.as_deref())?;
        let age = require_age(self.age.as_ref())?;
        let gender = require_text("gender", self.gender.as_deref())?;
        let disease = require_text("disease", self.disease.as_deref())?;
        let doctor = require_text("doctor", self.doctor.as_deref())?;

        let age = parse_age(age)?;

        Ok(Patient {
            pid: bounded_text("pid", pid, MAX_PID_CHARS)?,
            name: bounded_text("name", name, MAX_NAME_CHARS)?,
            age,
            gender: bounded_text("gender", gender, MAX_GENDER_CHARS)?,
            disease: bounded_text("disease", disease, MAX_DISEASE_CHARS)?,
            doctor: bounded_text("doctor", doctor, MAX_DOCTOR_CHARS)?,
        })
    }
}

impl From<&Patient> for PatientInput {
    fn from(patient: &Patient) -> Self {
        Self::new(
            patient.pid(),
            patient.name(),
            patient.age(),
            patient.gender(),
            patient.disease(),
            patient.doctor(),
        )
    }
}

/// A validated patient record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    pub(crate) pid: NonEmptyText,
    pub(crate) name: NonEmptyText,
    pub(crate) age: u8,
    pub(crate) gender: NonEmptyText,
    pub(crate) disease: NonEmptyText,
    pub(crate) doctor: NonEmptyText,
}

impl Patient {
    pub fn pid(&self) -> &str {
        self.pid.as_str()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Age in whole years, within `MIN_AGE..=MAX_AGE`.
    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> &str {
        self.gender.as_str()
    }

    pub fn disease(&self) -> &str {
        self.disease.as_str()
    }

    pub fn doctor(&self) -> &str {
        self.doctor.as_str()
    }

    /// The bucket this record lives in, recomputed from the patient ID.
    pub fn hash_index(&self) -> usize {
        compute_hash_index(self.pid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatientError;

    fn alice() -> PatientInput {
        PatientInput::new("P1", "Alice", 30u8, "Female", "Flu", "Dr. X")
    }

    #[test]
    fn test_validate_produces_trimmed_patient() {
        let input = PatientInput::new(
            "  P1 ",
            " Alice",
            AgeInput::Text("30 ".into()),
            "Female ",
            "Flu",
            " Dr. X ",
        );
        let patient = input.validate().expect("input should be valid");

        assert_eq!(patient.pid(), "P1");
        assert_eq!(patient.name(), "Alice");
        assert_eq!(patient.age(), 30);
        assert_eq!(patient.gender(), "Female");
        assert_eq!(patient.disease(), "Flu");
        assert_eq!(patient.doctor(), "Dr. X");
        assert_eq!(patient.hash_index(), 9);
    }

    #[test]
    fn test_validate_reports_first_missing_field_in_order() {
        let mut input = alice();
        input.gender = None;
        input.doctor = Some("   ".into());

        let err = input.validate().expect_err("missing gender should fail");
        assert!(
            matches!(err, PatientError::Validation(ref m) if m == "Missing or empty required field: gender"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_presence_is_checked_before_age_value() {
        let mut input = alice();
        input.age = Some(AgeInput::Years(0));
        input.doctor = None;

        let err = input.validate().expect_err("missing doctor should fail");
        assert!(
            matches!(err, PatientError::Validation(ref m) if m == "Missing or empty required field: doctor"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_blank_age_text_counts_as_missing() {
        let mut input = alice();
        input.age = Some(AgeInput::Text(" ".into()));

        let err = input.validate().expect_err("blank age should fail");
        assert!(
            matches!(err, PatientError::Validation(ref m) if m == "Missing or empty required field: age"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_overlong_pid_is_rejected() {
        let mut input = alice();
        input.pid = Some("P".repeat(51));

        let err = input.validate().expect_err("pid over 50 characters should fail");
        assert!(
            matches!(err, PatientError::Validation(ref m) if m == "pid must be at most 50 characters"),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_round_trip_through_input() {
        let patient = alice().validate().expect("input should be valid");
        let again = PatientInput::from(&patient)
            .validate()
            .expect("re-validating a stored patient should succeed");
        assert_eq!(patient, again);
    }
}
