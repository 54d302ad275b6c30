//! Snapshot save/load for the patient store.
//!
//! A snapshot is a single YAML document:
//!
//! ```yaml
//! version: 1
//! saved_at: 2026-10-17T09:30:00Z
//! patients:
//!   - pid: P1
//!     name: Alice
//!     age: 30
//!     gender: Female
//!     disease: Flu
//!     doctor: Dr. X
//! ```
//!
//! Patients are written in [`HashIndexedPatientStore::get_all`] order. The hash index is not
//! written; it is recomputed from the patient ID when the snapshot is loaded. Loading re-inserts
//! every record through [`HashIndexedPatientStore::add`], so a snapshot with an invalid or
//! duplicated record is rejected as a whole.
//!
//! This is basic save/load only: there is no journalling, and concurrent writers from several
//! processes are not coordinated.

use crate::constants::SNAPSHOT_VERSION;
use crate::error::{PatientError, PatientResult};
use crate::patient::{Patient, PatientInput};
use crate::store::HashIndexedPatientStore;
use chrono::{DateTime, Utc};
use hpr_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    patients: Vec<StoredPatient>,
}

// Blank text fields fail to decode, before any record reaches the store.
#[derive(Debug, Serialize, Deserialize)]
struct StoredPatient {
    pid: NonEmptyText,
    name: NonEmptyText,
    age: i64,
    gender: NonEmptyText,
    disease: NonEmptyText,
    doctor: NonEmptyText,
}

impl From<&Patient> for StoredPatient {
    fn from(p: &Patient) -> Self {
        Self {
            pid: p.pid.clone(),
            name: p.name.clone(),
            age: i64::from(p.age),
            gender: p.gender.clone(),
            disease: p.disease.clone(),
            doctor: p.doctor.clone(),
        }
    }
}

impl From<StoredPatient> for PatientInput {
    fn from(p: StoredPatient) -> Self {
        PatientInput {
            pid: Some(p.pid.into_inner()),
            name: Some(p.name.into_inner()),
            age: Some(crate::patient::AgeInput::Years(p.age)),
            gender: Some(p.gender.into_inner()),
            disease: Some(p.disease.into_inner()),
            doctor: Some(p.doctor.into_inner()),
        }
    }
}

/// A YAML snapshot file on disk.
#[derive(Clone, Debug)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot into a fresh store.
    ///
    /// A missing file is not an error: it yields an empty store, so a new deployment starts
    /// with no records.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the file exists but cannot be read ([`PatientError::FileRead`])
    /// - the content is not a snapshot document ([`PatientError::YamlDeserialization`])
    /// - the version is unsupported or a record is invalid or duplicated
    ///   ([`PatientError::SnapshotInvalid`])
    pub fn load(&self) -> PatientResult<HashIndexedPatientStore> {
        let mut store = HashIndexedPatientStore::new();

        if !self.path.exists() {
            tracing::info!(
                "no snapshot at {}, starting with an empty store",
                self.path.display()
            );
            return Ok(store);
        }

        let raw = fs::read_to_string(&self.path).map_err(PatientError::FileRead)?;
        let document: SnapshotDocument =
            serde_yaml::from_str(&raw).map_err(PatientError::YamlDeserialization)?;

        if document.version != SNAPSHOT_VERSION {
            return Err(PatientError::SnapshotInvalid(format!(
                "unsupported snapshot version {} (expected {})",
                document.version, SNAPSHOT_VERSION
            )));
        }

        for (i, stored) in document.patients.into_iter().enumerate() {
            let pid = stored.pid.to_string();
            store
                .add(&PatientInput::from(stored))
                .map_err(|e| PatientError::SnapshotInvalid(format!("record {i} ({pid}): {e}")))?;
        }

        tracing::info!(
            "loaded {} patient(s) from {} (saved at {})",
            store.len(),
            self.path.display(),
            document.saved_at.to_rfc3339()
        );

        Ok(store)
    }

    /// Writes the whole store to the snapshot file.
    ///
    /// The document is written to a sibling `.tmp` file first and then renamed over the target,
    /// so readers never observe a half-written snapshot.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - serialisation fails ([`PatientError::YamlSerialization`])
    /// - the temporary file cannot be written or renamed ([`PatientError::FileWrite`])
    pub fn save(&self, store: &HashIndexedPatientStore) -> PatientResult<()> {
        let document = SnapshotDocument {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            patients: store.iter().map(StoredPatient::from).collect(),
        };
        let yaml = serde_yaml::to_string(&document).map_err(PatientError::YamlSerialization)?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, yaml).map_err(PatientError::FileWrite)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PatientError::FileWrite(e));
        }

        tracing::debug!(
            "saved {} patient(s) to {}",
            store.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn populated_store() -> HashIndexedPatientStore {
        let mut store = HashIndexedPatientStore::new();
        for (pid, name) in [("P1", "Alice"), ("K", "Kemi"), ("Z", "Zara"), ("A", "Ade")] {
            store
                .add(&PatientInput::new(pid, name, 52u8, "Female", "Flu", "Dr. X"))
                .expect("add should succeed");
        }
        store
    }

    #[test]
    fn test_load_missing_file_gives_empty_store() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let snapshot = SnapshotFile::new(temp_dir.path().join("patients.yaml"));

        let store = snapshot.load().expect("load should succeed");
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load_restores_records_and_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let snapshot = SnapshotFile::new(temp_dir.path().join("patients.yaml"));
        let store = populated_store();

        snapshot.save(&store).expect("save should succeed");
        assert!(
            !temp_dir.path().join("patients.yaml.tmp").exists(),
            "temporary file should be renamed away"
        );

        let loaded = snapshot.load().expect("load should succeed");
        assert_eq!(loaded.get_all(), store.get_all());
        assert_eq!(loaded.get_by_id("P1").unwrap().hash_index(), 9);
    }

    #[test]
    fn test_snapshot_does_not_store_hash_index() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.yaml");
        SnapshotFile::new(&path)
            .save(&populated_store())
            .expect("save should succeed");

        let raw = fs::read_to_string(&path).expect("should read snapshot");
        assert!(raw.contains("version: 1"));
        assert!(raw.contains("pid: P1"));
        assert!(!raw.contains("hash_index"));
    }

    #[test]
    fn test_load_rejects_duplicate_records() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.yaml");
        let yaml = r#"
version: 1
saved_at: 2026-01-01T00:00:00Z
patients:
  - { pid: P1, name: Alice, age: 30, gender: Female, disease: Flu, doctor: Dr. X }
  - { pid: P1, name: Bob, age: 31, gender: Male, disease: Cold, doctor: Dr. Y }
"#;
        fs::write(&path, yaml).expect("should write snapshot");

        let err = SnapshotFile::new(&path)
            .load()
            .expect_err("duplicate pid should be rejected");
        assert!(
            matches!(err, PatientError::SnapshotInvalid(ref m) if m.contains("record 1 (P1)")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_load_rejects_invalid_age() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.yaml");
        let yaml = r#"
version: 1
saved_at: 2026-01-01T00:00:00Z
patients:
  - { pid: P1, name: Alice, age: 0, gender: Female, disease: Flu, doctor: Dr. X }
"#;
        fs::write(&path, yaml).expect("should write snapshot");

        let err = SnapshotFile::new(&path).load().expect_err("age 0 is invalid");
        assert!(matches!(err, PatientError::SnapshotInvalid(_)));
    }

    #[test]
    fn test_load_rejects_blank_text_field() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.yaml");
        let yaml = r#"
version: 1
saved_at: 2026-01-01T00:00:00Z
patients:
  - { pid: P1, name: "   ", age: 30, gender: Female, disease: Flu, doctor: Dr. X }
"#;
        fs::write(&path, yaml).expect("should write snapshot");

        let err = SnapshotFile::new(&path)
            .load()
            .expect_err("blank name should be rejected");
        assert!(
            matches!(err, PatientError::YamlDeserialization(ref e) if e.to_string().contains("empty")),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_load_rejects_unknown_version_and_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("patients.yaml");

        fs::write(&path, "version: 2\nsaved_at: 2026-01-01T00:00:00Z\npatients: []\n")
            .expect("should write snapshot");
        let err = SnapshotFile::new(&path).load().expect_err("version 2 is unknown");
        assert!(matches!(err, PatientError::SnapshotInvalid(_)));

        fs::write(&path, "invalid: yaml: content: [[[").expect("should write snapshot");
        let err = SnapshotFile::new(&path).load().expect_err("garbage should fail");
        assert!(matches!(err, PatientError::YamlDeserialization(_)));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let snapshot = SnapshotFile::new(temp_dir.path().join("missing").join("patients.yaml"));

        let err = snapshot
            .save(&populated_store())
            .expect_err("parent directory does not exist");
        assert!(matches!(err, PatientError::FileWrite(_)));
    }
}
