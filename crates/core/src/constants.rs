//! Constants used throughout the HPR core crate.
//!
//! Field limits mirror the column widths of the patient table the records were originally kept
//! in, so data exported from there always fits.

/// Number of hash buckets. Fixed by the modulo base of the hash function.
pub const BUCKET_COUNT: usize = 10;

/// Youngest accepted age, in whole years.
pub const MIN_AGE: u8 = 1;

/// Oldest accepted age, in whole years.
pub const MAX_AGE: u8 = 150;

/// Maximum length of a patient ID, in characters.
pub const MAX_PID_CHARS: usize = 50;

/// Maximum length of a patient name, in characters.
pub const MAX_NAME_CHARS: usize = 100;

/// Maximum length of the gender field, in characters.
pub const MAX_GENDER_CHARS: usize = 20;

/// Maximum length of the disease field, in characters.
pub const MAX_DISEASE_CHARS: usize = 200;

/// Maximum length of the attending doctor field, in characters.
pub const MAX_DOCTOR_CHARS: usize = 100;

/// Snapshot filename used by the CLI when no data file is configured.
pub const DEFAULT_DATA_FILE: &str = "patients.yaml";

/// Current on-disk snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;
