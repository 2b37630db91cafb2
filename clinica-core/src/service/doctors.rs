use super::{Params, find_matching, param, remove, require, save};
use crate::error::{ClinicaError, Result};
use crate::model::{Doctor, NewDoctor};
use crate::store::{Filter, Record, RecordStore};
use crate::uniqueness::ensure_unique;
use crate::validation::{ensure_field, ensure_valid, fields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoctorQuery {
    Name { last_name: String, first_name: String },
    Speciality(String),
    Email(String),
    PhoneNumber(String),
}

impl DoctorQuery {
    pub fn from_params(params: &Params) -> Result<Self> {
        if let (Some(last_name), Some(first_name)) =
            (param(params, "last_name"), param(params, "first_name"))
        {
            ensure_field(fields::is_valid_name(last_name) && fields::is_valid_name(first_name))?;
            return Ok(Self::Name {
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
            });
        }
        if let Some(speciality) = param(params, "speciality") {
            ensure_field(fields::is_valid_speciality(speciality))?;
            return Ok(Self::Speciality(speciality.to_string()));
        }
        if let Some(email) = param(params, "email") {
            ensure_field(fields::is_valid_email(email))?;
            return Ok(Self::Email(email.to_string()));
        }
        if let Some(phone_number) = param(params, "phone_number") {
            ensure_field(fields::is_valid_phone_number(phone_number))?;
            return Ok(Self::PhoneNumber(phone_number.to_string()));
        }
        Err(ClinicaError::validation(
            "At least one of last_name and first_name, speciality, email, or phone_number should be provided",
        ))
    }

    fn filter(&self) -> Filter {
        match self {
            Self::Name {
                last_name,
                first_name,
            } => Filter::new()
                .eq("last_name", last_name.as_str())
                .eq("first_name", first_name.as_str()),
            Self::Speciality(speciality) => Filter::new().eq("speciality", speciality.as_str()),
            Self::Email(email) => Filter::new().eq("email", email.as_str()),
            Self::PhoneNumber(phone_number) => {
                Filter::new().eq("phone_number", phone_number.as_str())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum DoctorChange {
    /// Both names at once; names are not unique
    Name { last_name: String, first_name: String },
    Email(String),
    PhoneNumber(String),
    Speciality(String),
}

pub fn create<S: RecordStore>(store: &S, new: NewDoctor) -> Result<Doctor> {
    ensure_valid(&new, Doctor::KIND)?;
    ensure_unique::<Doctor, S>(
        store,
        &[
            ("email", new.email.as_str()),
            ("phone_number", new.phone_number.as_str()),
        ],
        None,
    )?;

    let doctor = store.insert(Doctor::from(new))?;
    tracing::info!(id = doctor.id, speciality = %doctor.speciality, "Doctor created");
    Ok(doctor)
}

pub fn get<S: RecordStore>(store: &S, id: i64) -> Result<Doctor> {
    require(store, &id.to_string())
}

pub fn search<S: RecordStore>(store: &S, query: &DoctorQuery) -> Result<Vec<Doctor>> {
    find_matching(store, &query.filter())
}

pub fn update<S: RecordStore>(store: &S, id: i64, change: DoctorChange) -> Result<()> {
    let key = id.to_string();
    let valid = match &change {
        DoctorChange::Name {
            last_name,
            first_name,
        } => fields::is_valid_name(last_name) && fields::is_valid_name(first_name),
        DoctorChange::Email(email) => fields::is_valid_email(email),
        DoctorChange::PhoneNumber(phone_number) => fields::is_valid_phone_number(phone_number),
        DoctorChange::Speciality(speciality) => fields::is_valid_speciality(speciality),
    };
    ensure_field(valid)?;

    let mut doctor: Doctor = require(store, &key)?;

    match change {
        DoctorChange::Name {
            last_name,
            first_name,
        } => {
            doctor.last_name = last_name;
            doctor.first_name = first_name;
        }
        DoctorChange::Email(email) => {
            ensure_unique::<Doctor, S>(store, &[("email", email.as_str())], Some(&key))?;
            doctor.email = email;
        }
        DoctorChange::PhoneNumber(phone_number) => {
            ensure_unique::<Doctor, S>(store, &[("phone_number", phone_number.as_str())], Some(&key))?;
            doctor.phone_number = phone_number;
        }
        DoctorChange::Speciality(speciality) => doctor.speciality = speciality,
    }

    save(store, &doctor)
}

pub fn delete<S: RecordStore>(store: &S, id: i64) -> Result<()> {
    remove::<Doctor, S>(store, &id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn new_doctor(email: &str, phone_number: &str) -> NewDoctor {
        NewDoctor {
            last_name: "Ionescu".to_string(),
            first_name: "Maria".to_string(),
            email: email.to_string(),
            phone_number: phone_number.to_string(),
            speciality: "Cardiolog".to_string(),
        }
    }

    #[test]
    fn test_create_then_get() {
        let store = MemoryStore::new();
        let created = create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();
        assert!(created.id > 0);
        let fetched = get(&store, created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_create_rejects_either_collision() {
        let store = MemoryStore::new();
        create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();

        let err = create(&store, new_doctor("other@clinica.ro", "0722000111")).unwrap_err();
        match err {
            ClinicaError::Conflict(conflict) => assert_eq!(conflict.field, "phone_number"),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = create(&store, new_doctor("maria@clinica.ro", "0722000999")).unwrap_err();
        match err {
            ClinicaError::Conflict(conflict) => assert_eq!(conflict.field, "email"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count::<Doctor>(), 1);
    }

    #[test]
    fn test_update_phone_keeps_own_value() {
        let store = MemoryStore::new();
        let doctor = create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();
        update(&store, doctor.id, DoctorChange::PhoneNumber("0722000111".to_string())).unwrap();
        update(&store, doctor.id, DoctorChange::PhoneNumber("0722000222".to_string())).unwrap();
        assert_eq!(get(&store, doctor.id).unwrap().phone_number, "0722000222");
    }

    #[test]
    fn test_update_phone_conflicts_with_other_doctor() {
        let store = MemoryStore::new();
        create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();
        let other = create(&store, new_doctor("ana@clinica.ro", "0722000222")).unwrap();

        let err = update(
            &store,
            other.id,
            DoctorChange::PhoneNumber("0722000111".to_string()),
        )
        .unwrap_err();
        match err {
            ClinicaError::Conflict(conflict) => assert_eq!(conflict.field, "phone_number"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(get(&store, other.id).unwrap().phone_number, "0722000222");
    }

    #[test]
    fn test_update_email_conflicts_with_other_doctor() {
        let store = MemoryStore::new();
        create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();
        let other = create(&store, new_doctor("ana@clinica.ro", "0722000222")).unwrap();

        let err = update(
            &store,
            other.id,
            DoctorChange::Email("maria@clinica.ro".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, ClinicaError::Conflict(ref c) if c.field == "email"));
        assert_eq!(get(&store, other.id).unwrap().email, "ana@clinica.ro");
    }

    #[test]
    fn test_update_validation_precedes_lookup() {
        let store = MemoryStore::new();
        let err = update(&store, 42, DoctorChange::Speciality("Dentist".to_string())).unwrap_err();
        assert!(matches!(err, ClinicaError::Validation { .. }));

        let err = update(&store, 42, DoctorChange::Speciality("Neurolog".to_string())).unwrap_err();
        assert!(matches!(err, ClinicaError::NotFound { .. }));
    }

    #[test]
    fn test_search_by_speciality() {
        let store = MemoryStore::new();
        create(&store, new_doctor("maria@clinica.ro", "0722000111")).unwrap();
        let mut second = new_doctor("dan@clinica.ro", "0722000222");
        second.speciality = "Neurolog".to_string();
        create(&store, second).unwrap();

        let mut params = Params::new();
        params.insert("speciality".to_string(), "Neurolog".to_string());
        let query = DoctorQuery::from_params(&params).unwrap();
        let found = search(&store, &query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "dan@clinica.ro");
    }
}
