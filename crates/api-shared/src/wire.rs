//! JSON wire types for the patient API.
//!
//! Every response carries a `success` flag, matching the envelope the browser front-end already
//! consumes. Request decoding is lenient in the same way an HTML form is: scalar fields may be
//! sent as strings or numbers, and missing fields decode to `None` so the core can report them
//! by name.

use hpr_core::{AgeInput, BucketSummary, Patient, PatientInput};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// ============================================================================
// REQUESTS
// ============================================================================

/// Body of `POST /api/patients`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "P1")]
    pub pid: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Alice")]
    pub name: Option<String>,
    /// Whole years, as a number or a numeric string.
    #[serde(default)]
    #[schema(value_type = Option<u32>, example = 30)]
    pub age: Option<Value>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Female")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Flu")]
    pub disease: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    #[schema(example = "Dr. X")]
    pub doctor: Option<String>,
}

impl CreatePatientReq {
    /// Decodes a raw request body.
    ///
    /// Returns `Ok(None)` when there is no data to read: an empty or whitespace-only body, or a
    /// JSON value that carries nothing (`null`, `false`, `0`, `""`, `[]`, `{}`). Any other
    /// object decodes normally, so an object with none of the expected fields reaches validation
    /// and is reported by its first missing field.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the body is malformed or is not an object.
    pub fn from_json_body(body: &[u8]) -> Result<Option<Self>, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let value: Value = serde_json::from_slice(body)?;
        if carries_no_data(&value) {
            return Ok(None);
        }
        serde_json::from_value(value).map(Some)
    }
}

fn carries_no_data(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

impl From<CreatePatientReq> for PatientInput {
    fn from(req: CreatePatientReq) -> Self {
        PatientInput {
            pid: req.pid,
            name: req.name,
            age: req.age.and_then(age_input),
            gender: req.gender,
            disease: req.disease,
            doctor: req.doctor,
        }
    }
}

/// Accepts a string, number, or boolean and renders it as text. `null` decodes to `None`.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other}"
        ))),
    }
}

/// Fractional numbers are truncated to whole years; anything that is neither a number nor a
/// string is passed on as text so validation rejects it as a non-numeric age.
fn age_input(value: Value) -> Option<AgeInput> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(AgeInput::Text(s)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(years) => AgeInput::Years(years),
            None => match n.as_f64() {
                Some(f) if f.is_finite() => AgeInput::Years(f.trunc() as i64),
                _ => AgeInput::Text(n.to_string()),
            },
        }),
        other => Some(AgeInput::Text(other.to_string())),
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// A stored patient, including its derived hash index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    #[schema(example = "P1")]
    pub pid: String,
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = 30)]
    pub age: u8,
    #[schema(example = "Female")]
    pub gender: String,
    #[schema(example = "Flu")]
    pub disease: String,
    #[schema(example = "Dr. X")]
    pub doctor: String,
    /// Bucket number, `sum of the ID's character codes mod 10`.
    #[schema(example = 9)]
    pub hash_index: usize,
}

impl From<&Patient> for PatientRes {
    fn from(p: &Patient) -> Self {
        Self {
            pid: p.pid().to_owned(),
            name: p.name().to_owned(),
            age: p.age(),
            gender: p.gender().to_owned(),
            disease: p.disease().to_owned(),
            doctor: p.doctor().to_owned(),
            hash_index: p.hash_index(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub success: bool,
    pub data: Vec<PatientRes>,
    pub count: usize,
}

impl ListPatientsRes {
    pub fn new(patients: &[Patient]) -> Self {
        Self {
            success: true,
            data: patients.iter().map(PatientRes::from).collect(),
            count: patients.len(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct GetPatientRes {
    pub success: bool,
    pub data: PatientRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientRes {
    pub success: bool,
    pub message: String,
    pub data: PatientRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletePatientRes {
    pub success: bool,
    pub message: String,
}

/// Occupancy of one hash bucket.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct BucketRes {
    #[schema(example = 9)]
    pub hash_index: usize,
    pub count: usize,
    pub pids: Vec<String>,
}

impl From<BucketSummary> for BucketRes {
    fn from(b: BucketSummary) -> Self {
        Self {
            hash_index: b.hash_index,
            count: b.pids.len(),
            pids: b.pids,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListBucketsRes {
    pub success: bool,
    pub data: Vec<BucketRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    #[schema(example = "Patient not found")]
    pub error: String,
}

impl ErrorRes {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_req_accepts_form_style_strings() {
        let req: CreatePatientReq = serde_json::from_value(json!({
            "pid": "P1", "name": "Alice", "age": "30",
            "gender": "Female", "disease": "Flu", "doctor": "Dr. X"
        }))
        .expect("form payload should decode");

        let patient = PatientInput::from(req)
            .validate()
            .expect("form payload should validate");
        assert_eq!(patient.age(), 30);
        assert_eq!(patient.hash_index(), 9);
    }

    #[test]
    fn test_create_req_accepts_numbers() {
        let req: CreatePatientReq = serde_json::from_value(json!({
            "pid": 1001, "name": "Bob", "age": 41.9,
            "gender": "Male", "disease": "Cold", "doctor": "Dr. Y"
        }))
        .expect("numeric payload should decode");

        let input = PatientInput::from(req);
        assert_eq!(input.pid.as_deref(), Some("1001"));
        assert_eq!(input.age, Some(AgeInput::Years(41)));
    }

    #[test]
    fn test_missing_and_null_fields_decode_to_none() {
        let req: CreatePatientReq = serde_json::from_value(json!({ "pid": "P1", "name": null }))
            .expect("partial payload should decode");

        let input = PatientInput::from(req);
        assert_eq!(input.pid.as_deref(), Some("P1"));
        assert!(input.name.is_none());
        assert!(input.age.is_none());
        assert!(input.doctor.is_none());
    }

    #[test]
    fn test_non_numeric_age_is_kept_for_validation() {
        let req: CreatePatientReq = serde_json::from_value(json!({ "age": true }))
            .expect("payload should decode");
        assert_eq!(
            PatientInput::from(req).age,
            Some(AgeInput::Text("true".into()))
        );
    }

    #[test]
    fn test_body_without_data_decodes_to_none() {
        for body in ["", "  \n", "null", "{}", "[]", "\"\"", "false", "0"] {
            let req = CreatePatientReq::from_json_body(body.as_bytes())
                .unwrap_or_else(|e| panic!("{body:?} should decode: {e}"));
            assert!(req.is_none(), "{body:?} should carry no data");
        }
    }

    #[test]
    fn test_object_without_known_fields_reaches_validation() {
        let req = CreatePatientReq::from_json_body(br#"{"foo": 1}"#)
            .expect("object should decode")
            .expect("non-empty object carries data");

        let err = PatientInput::from(req)
            .validate()
            .expect_err("pid is missing");
        assert_eq!(err.to_string(), "Missing or empty required field: pid");
    }

    #[test]
    fn test_malformed_or_non_object_body_is_an_error() {
        assert!(CreatePatientReq::from_json_body(b"{not json").is_err());
        assert!(CreatePatientReq::from_json_body(b"42").is_err());
        assert!(CreatePatientReq::from_json_body(br#""P1""#).is_err());
    }

    #[test]
    fn test_nested_text_field_is_rejected() {
        let err = serde_json::from_value::<CreatePatientReq>(json!({ "name": ["Alice"] }))
            .expect_err("arrays are not text");
        assert!(err.to_string().contains("expected a string or number"));
    }

    #[test]
    fn test_patient_res_serialises_hash_index() {
        let patient = PatientInput::new("P1", "Alice", 30u8, "Female", "Flu", "Dr. X")
            .validate()
            .expect("input should be valid");

        let value = serde_json::to_value(PatientRes::from(&patient)).expect("should serialise");
        assert_eq!(
            value,
            json!({
                "pid": "P1", "name": "Alice", "age": 30, "gender": "Female",
                "disease": "Flu", "doctor": "Dr. X", "hash_index": 9
            })
        );
    }
}
