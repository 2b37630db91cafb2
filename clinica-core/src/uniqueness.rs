//! Uniqueness checks
//!
//! Fields such as e-mail addresses and phone numbers must be exclusive among
//! records of the same kind. The check looks the candidate values up before
//! the write; it is not atomic with the write.

use serde::Serialize;
use std::fmt;

use crate::error::{ClinicaError, Result};
use crate::store::{Filter, Record, RecordStore};

/// A unique field value already held by another record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub kind: &'static str,
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Another {} already has this {} ({})",
            self.kind.to_lowercase(),
            self.field,
            self.value
        )
    }
}

/// Find the first candidate value that collides with an existing record.
///
/// Candidates are checked in order and the first collision is reported. A
/// record whose key equals `exclude` never counts as a collision, which lets
/// an update keep its own value.
pub fn find_conflict<R: Record, S: RecordStore>(
    store: &S,
    candidates: &[(&'static str, &str)],
    exclude: Option<&str>,
) -> Result<Option<Conflict>> {
    for &(field, value) in candidates {
        let holders = store.find::<R>(&Filter::new().eq(field, value))?;
        if holders.iter().any(|holder| Some(holder.key().as_str()) != exclude) {
            return Ok(Some(Conflict {
                kind: R::KIND,
                field,
                value: value.to_string(),
            }));
        }
    }
    Ok(None)
}

/// Fail with [`ClinicaError::Conflict`] if any candidate collides
pub fn ensure_unique<R: Record, S: RecordStore>(
    store: &S,
    candidates: &[(&'static str, &str)],
    exclude: Option<&str>,
) -> Result<()> {
    match find_conflict::<R, S>(store, candidates, exclude)? {
        Some(conflict) => {
            tracing::debug!(
                kind = conflict.kind,
                field = conflict.field,
                "Uniqueness check rejected value"
            );
            Err(ClinicaError::Conflict(conflict))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Doctor;
    use crate::testing::MemoryStore;

    fn seed(store: &MemoryStore) -> Doctor {
        store
            .insert(Doctor {
                id: 0,
                last_name: "Ionescu".to_string(),
                first_name: "Maria".to_string(),
                email: "maria@clinica.ro".to_string(),
                phone_number: "0722000111".to_string(),
                speciality: "Cardiolog".to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_no_conflict_on_fresh_values() {
        let store = MemoryStore::new();
        seed(&store);
        let result = find_conflict::<Doctor, _>(
            &store,
            &[("email", "other@clinica.ro"), ("phone_number", "0722000222")],
            None,
        )
        .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_reports_colliding_field() {
        let store = MemoryStore::new();
        seed(&store);
        let conflict = find_conflict::<Doctor, _>(
            &store,
            &[("email", "other@clinica.ro"), ("phone_number", "0722000111")],
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(conflict.kind, "Doctor");
        assert_eq!(conflict.field, "phone_number");
    }

    #[test]
    fn test_first_collision_wins() {
        let store = MemoryStore::new();
        seed(&store);
        let conflict = find_conflict::<Doctor, _>(
            &store,
            &[("email", "maria@clinica.ro"), ("phone_number", "0722000111")],
            None,
        )
        .unwrap()
        .unwrap();
        assert_eq!(conflict.field, "email");
    }

    #[test]
    fn test_own_record_excluded() {
        let store = MemoryStore::new();
        let doctor = seed(&store);
        let key = doctor.id.to_string();
        assert!(ensure_unique::<Doctor, _>(&store, &[("email", "maria@clinica.ro")], Some(&key)).is_ok());
        assert!(ensure_unique::<Doctor, _>(&store, &[("email", "maria@clinica.ro")], Some("999")).is_err());
    }
}
