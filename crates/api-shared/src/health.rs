use crate::wire::HealthRes;
use hpr_core::PatientService;

/// Health checks shared by every HPR API surface.
///
/// The patient store is in-process, so "healthy" means the store can still be read: its lock
/// has not been poisoned by a panicking writer.
pub struct HealthService;

impl HealthService {
    /// Checks that the patient store is readable.
    ///
    /// # Returns
    /// A `HealthRes` with `success: true` and the record count, or `success: false` with the
    /// failure reason.
    pub fn check_health(patients: &PatientService) -> HealthRes {
        match patients.patient_count() {
            Ok(count) => HealthRes {
                success: true,
                message: format!("API is running and patient store is healthy ({count} patient(s))"),
                error: None,
            },
            Err(e) => HealthRes {
                success: false,
                message: "API is running but patient store is unavailable".into(),
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hpr_core::PatientInput;

    #[test]
    fn test_check_health_reports_count() {
        let patients = PatientService::in_memory();
        patients
            .add_patient(&PatientInput::new("P1", "Alice", 30u8, "Female", "Flu", "Dr. X"))
            .expect("add should succeed");

        let res = HealthService::check_health(&patients);
        assert!(res.success);
        assert!(res.message.contains("(1 patient(s))"), "got {}", res.message);
        assert!(res.error.is_none());
    }
}
