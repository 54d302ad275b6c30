//! Error taxonomy for core patient operations.

/// Errors returned by the patient store, its snapshot file, and configuration.
///
/// `Validation`, `DuplicateKey` and `NotFound` are caller errors; the rest are internal.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    /// Malformed or missing input to a create operation.
    #[error("{0}")]
    Validation(String),
    /// A create operation used a patient ID that is already stored.
    #[error("Patient ID already exists")]
    DuplicateKey { pid: String },
    /// A read or delete operation used a patient ID that is not stored.
    #[error("Patient not found")]
    NotFound { pid: String },

    #[error("failed to read snapshot file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write snapshot file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),
    #[error("invalid snapshot: {0}")]
    SnapshotInvalid(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("patient store is unavailable")]
    StoreUnavailable,
}

impl PatientError {
    pub(crate) fn missing_field(field: &str) -> Self {
        Self::Validation(format!("Missing or empty required field: {field}"))
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
