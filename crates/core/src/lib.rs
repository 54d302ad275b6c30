//! # HPR Core
//!
//! Core business logic for the HPR hospital patient record system.
//!
//! This crate contains pure data operations:
//! - Character-sum hashing of patient IDs into ten buckets
//! - The hash-indexed patient store (create, read, list, delete)
//! - Validation of create requests
//! - Basic snapshot save/load to a YAML file
//!
//! **No API concerns**: HTTP servers, wire formats, and CLI parsing belong in `api-rest`,
//! `api-shared`, or `hpr-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod hashing;
pub mod patient;
pub mod persistence;
pub mod service;
pub mod store;
mod validation;

pub use config::CoreConfig;
pub use constants::{BUCKET_COUNT, DEFAULT_DATA_FILE};
pub use error::{PatientError, PatientResult};
pub use hashing::compute_hash_index;
pub use hpr_types::{NonEmptyText, TextError};
pub use patient::{AgeInput, Patient, PatientInput};
pub use persistence::SnapshotFile;
pub use service::{BucketSummary, PatientService};
pub use store::HashIndexedPatientStore;
