//! Patient service: the shared, thread-safe entry point to the store.
//!
//! [`PatientService`] owns a [`HashIndexedPatientStore`] behind a reader/writer lock and, when a
//! data file is configured, a [`SnapshotFile`]. It is cheap to clone; clones share the same
//! store, which is how API handlers receive it.
//!
//! ## Locking
//!
//! - `add_patient` and `delete_patient` hold the write lock across the whole
//!   check-then-mutate sequence and the snapshot write that follows it.
//! - Reads hold the read lock, so they never observe a half-applied mutation.
//!
//! If the snapshot write fails, the in-memory change is rolled back before the lock is released
//! and the error is returned: a failed operation never changes the store.

use crate::config::CoreConfig;
use crate::error::{PatientError, PatientResult};
use crate::patient::{Patient, PatientInput};
use crate::persistence::SnapshotFile;
use crate::store::HashIndexedPatientStore;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Occupancy of one hash bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketSummary {
    /// Bucket number, `0..BUCKET_COUNT`.
    pub hash_index: usize,
    /// Patient IDs in the bucket, in insertion order.
    pub pids: Vec<String>,
}

/// Pure patient data operations - no API concerns
#[derive(Clone, Debug)]
pub struct PatientService {
    store: Arc<RwLock<HashIndexedPatientStore>>,
    snapshot: Option<Arc<SnapshotFile>>,
}

impl PatientService {
    /// Creates a service from configuration, loading the snapshot if one is configured.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SnapshotFile::load`].
    pub fn new(cfg: Arc<CoreConfig>) -> PatientResult<Self> {
        match cfg.data_file() {
            Some(path) => {
                let snapshot = SnapshotFile::new(path);
                let store = snapshot.load()?;
                Ok(Self {
                    store: Arc::new(RwLock::new(store)),
                    snapshot: Some(Arc::new(snapshot)),
                })
            }
            None => Ok(Self::in_memory()),
        }
    }

    /// Creates a service with an empty store and no snapshot file.
    pub fn in_memory() -> Self {
        Self::with_store(HashIndexedPatientStore::new())
    }

    /// Wraps an existing store, without a snapshot file.
    pub fn with_store(store: HashIndexedPatientStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            snapshot: None,
        }
    }

    /// Lists every patient: bucket 0 through 9, insertion order within a bucket.
    pub fn list_patients(&self) -> PatientResult<Vec<Patient>> {
        Ok(self.read()?.iter().cloned().collect())
    }

    /// Fetches one patient by ID.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if the ID is not stored.
    pub fn get_patient(&self, pid: &str) -> PatientResult<Patient> {
        self.read()?.get_by_id(pid).cloned()
    }

    /// Validates and stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - validation fails ([`PatientError::Validation`])
    /// - the patient ID is already stored ([`PatientError::DuplicateKey`])
    /// - the snapshot cannot be written (the insert is rolled back)
    pub fn add_patient(&self, input: &PatientInput) -> PatientResult<Patient> {
        let mut store = self.write()?;
        let patient = store.add(input)?;

        if let Err(e) = self.persist(&store) {
            // Cannot fail: the record was inserted under this same guard.
            let _ = store.take(patient.pid());
            tracing::error!(
                "snapshot write failed, rolled back add of {}: {}",
                patient.pid(),
                e
            );
            return Err(e);
        }

        tracing::info!(
            "added patient {} to bucket {}",
            patient.pid(),
            patient.hash_index()
        );
        Ok(patient)
    }

    /// Deletes a patient by ID.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the patient ID is not stored ([`PatientError::NotFound`])
    /// - the snapshot cannot be written (the delete is rolled back)
    pub fn delete_patient(&self, pid: &str) -> PatientResult<()> {
        let mut store = self.write()?;
        let (position, patient) = store.take(pid)?;

        if let Err(e) = self.persist(&store) {
            store.restore(position, patient);
            tracing::error!("snapshot write failed, rolled back delete of {}: {}", pid, e);
            return Err(e);
        }

        tracing::info!(
            "deleted patient {} from bucket {}",
            pid,
            patient.hash_index()
        );
        Ok(())
    }

    /// Summarises every bucket, including empty ones.
    pub fn bucket_summary(&self) -> PatientResult<Vec<BucketSummary>> {
        let store = self.read()?;
        Ok((0..crate::BUCKET_COUNT)
            .map(|hash_index| BucketSummary {
                hash_index,
                pids: store
                    .bucket(hash_index)
                    .unwrap_or_default()
                    .iter()
                    .map(|p| p.pid().to_owned())
                    .collect(),
            })
            .collect())
    }

    /// Number of stored patients. Doubles as a health probe: it fails only if the store lock is
    /// poisoned.
    pub fn patient_count(&self) -> PatientResult<usize> {
        Ok(self.read()?.len())
    }

    /// The configured snapshot file, if any.
    pub fn snapshot(&self) -> Option<&SnapshotFile> {
        self.snapshot.as_deref()
    }

    fn persist(&self, store: &HashIndexedPatientStore) -> PatientResult<()> {
        match &self.snapshot {
            Some(snapshot) => snapshot.save(store),
            None => Ok(()),
        }
    }

    fn read(&self) -> PatientResult<RwLockReadGuard<'_, HashIndexedPatientStore>> {
        self.store.read().map_err(|_| PatientError::StoreUnavailable)
    }

    fn write(&self) -> PatientResult<RwLockWriteGuard<'_, HashIndexedPatientStore>> {
        self.store.write().map_err(|_| PatientError::StoreUnavailable)
    }
}
