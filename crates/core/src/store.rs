//! Hash-indexed patient store.
//!
//! Records are partitioned into [`BUCKET_COUNT`] fixed buckets by
//! [`compute_hash_index`](crate::compute_hash_index) of the patient ID. Lookups and deletes only
//! scan the bucket the ID hashes to, so their cost is bounded by bucket occupancy rather than the
//! total number of records.
//!
//! ## Layout
//!
//! ```text
//! buckets[0] -> [P..., P...]      insertion order within each bucket
//! buckets[1] -> []
//! ...
//! buckets[9] -> [P1]
//! ```
//!
//! Buckets are created empty when the store is constructed and are never destroyed, only
//! emptied.
//!
//! ## Pure Data Operations
//!
//! The store is a plain owned value with no interior locking. Sharing it between request handlers
//! is the job of [`PatientService`](crate::PatientService).

use crate::constants::BUCKET_COUNT;
use crate::error::{PatientError, PatientResult};
use crate::hashing::compute_hash_index;
use crate::patient::{Patient, PatientInput};

/// Bucketed storage of patient records keyed by patient ID.
#[derive(Clone, Debug)]
pub struct HashIndexedPatientStore {
    buckets: [Vec<Patient>; BUCKET_COUNT],
}

impl Default for HashIndexedPatientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HashIndexedPatientStore {
    /// Creates a store with every bucket empty.
    pub fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| Vec::new()),
        }
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Validates `input` and appends the resulting record to its bucket.
    ///
    /// Insert-only: an existing record is never replaced.
    ///
    /// # Returns
    ///
    /// The stored record. Its [`hash_index`](Patient::hash_index) names the bucket it went into.
    ///
    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - a field is missing or invalid ([`PatientError::Validation`])
    /// - a record with the same trimmed patient ID exists ([`PatientError::DuplicateKey`])
    ///
    /// The store is unchanged on error.
    pub fn add(&mut self, input: &PatientInput) -> PatientResult<Patient> {
        let patient = input.validate()?;
        let bucket = &mut self.buckets[patient.hash_index()];

        if bucket.iter().any(|p| p.pid() == patient.pid()) {
            return Err(PatientError::DuplicateKey {
                pid: patient.pid().to_owned(),
            });
        }

        bucket.push(patient.clone());
        Ok(patient)
    }

    /// Looks up a record by patient ID, scanning only the bucket the ID hashes to.
    ///
    /// The ID is matched exactly, without trimming.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record has this ID.
    pub fn get_by_id(&self, pid: &str) -> PatientResult<&Patient> {
        self.buckets[compute_hash_index(pid)]
            .iter()
            .find(|p| p.pid() == pid)
            .ok_or_else(|| PatientError::NotFound { pid: pid.to_owned() })
    }

    /// Returns every record: bucket 0 through 9, insertion order within a bucket.
    pub fn get_all(&self) -> Vec<&Patient> {
        self.iter().collect()
    }

    /// Iterates over every record in [`get_all`](Self::get_all) order.
    pub fn iter(&self) -> impl Iterator<Item = &Patient> + '_ {
        self.buckets.iter().flatten()
    }

    /// Removes the record with this patient ID.
    ///
    /// Records in the same bucket keep their relative order, and no other bucket is touched.
    ///
    /// # Returns
    ///
    /// The removed record.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::NotFound`] if no record has this ID. The store is unchanged.
    pub fn delete_by_id(&mut self, pid: &str) -> PatientResult<Patient> {
        self.take(pid).map(|(_, patient)| patient)
    }

    // ========================================================================
    // OCCUPANCY
    // ========================================================================

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Records in bucket `index`, or `None` if `index >= BUCKET_COUNT`.
    pub fn bucket(&self, index: usize) -> Option<&[Patient]> {
        self.buckets.get(index).map(Vec::as_slice)
    }

    /// Number of records in each bucket.
    pub fn bucket_sizes(&self) -> [usize; BUCKET_COUNT] {
        std::array::from_fn(|i| self.buckets[i].len())
    }

    // ========================================================================
    // ROLLBACK SUPPORT
    // ========================================================================

    /// Removes a record and reports its position within its bucket.
    pub(crate) fn take(&mut self, pid: &str) -> PatientResult<(usize, Patient)> {
        let bucket = &mut self.buckets[compute_hash_index(pid)];
        let position = bucket
            .iter()
            .position(|p| p.pid() == pid)
            .ok_or_else(|| PatientError::NotFound { pid: pid.to_owned() })?;
        Ok((position, bucket.remove(position)))
    }

    /// Puts a record taken by [`take`](Self::take) back where it was.
    pub(crate) fn restore(&mut self, position: usize, patient: Patient) {
        let bucket = &mut self.buckets[patient.hash_index()];
        let position = position.min(bucket.len());
        bucket.insert(position, patient);
    }
}
