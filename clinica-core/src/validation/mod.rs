//! Validation for inbound payloads
//!
//! `fields`: one predicate per primitive field
//! `rules`: per-entity conjunction of the field predicates

pub mod fields;
pub mod rules;

pub use rules::Validate;

use crate::error::{ClinicaError, Result};

/// Reject a payload that fails its rule check
pub fn ensure_valid<T: Validate>(payload: &T, kind: &str) -> Result<()> {
    if payload.is_valid() {
        Ok(())
    } else {
        Err(ClinicaError::validation(format!(
            "The {} could not be registered due to errors in the input data",
            kind.to_lowercase()
        )))
    }
}

/// Reject a single field value that fails its validator
pub fn ensure_field(valid: bool) -> Result<()> {
    if valid {
        Ok(())
    } else {
        Err(ClinicaError::validation("Validation error in input data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewAppointment;

    #[test]
    fn test_ensure_valid_message() {
        let appointment = NewAppointment {
            patient_id: "1960101123456".to_string(),
            doctor_id: 1,
            date: "2030-01-01".to_string(),
            status: "Onorata".to_string(),
        };
        let err = ensure_valid(&appointment, "Appointment").unwrap_err();
        assert!(matches!(err, ClinicaError::Validation { .. }));
        assert!(err.to_string().contains("appointment"));
    }

    #[test]
    fn test_ensure_field() {
        assert!(ensure_field(true).is_ok());
        assert!(ensure_field(false).is_err());
    }
}
