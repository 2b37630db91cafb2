use super::{Params, find_matching, param, remove, require, save};
use crate::error::{ClinicaError, Result};
use crate::model::{NewPatient, Patient};
use crate::store::{Filter, Record, RecordStore};
use crate::uniqueness::ensure_unique;
use crate::validation::{ensure_field, ensure_valid, fields};

/// Patient lookups, in order of precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientQuery {
    Cnp(String),
    Name { last_name: String, first_name: String },
    PhoneNumber(String),
    Email(String),
}

impl PatientQuery {
    pub fn from_params(params: &Params) -> Result<Self> {
        if let Some(cnp) = param(params, "cnp") {
            ensure_field(fields::is_valid_cnp(cnp))?;
            return Ok(Self::Cnp(cnp.to_string()));
        }
        if let (Some(last_name), Some(first_name)) =
            (param(params, "last_name"), param(params, "first_name"))
        {
            ensure_field(fields::is_valid_name(last_name) && fields::is_valid_name(first_name))?;
            return Ok(Self::Name {
                last_name: last_name.to_string(),
                first_name: first_name.to_string(),
            });
        }
        if let Some(phone_number) = param(params, "phone_number") {
            ensure_field(fields::is_valid_phone_number(phone_number))?;
            return Ok(Self::PhoneNumber(phone_number.to_string()));
        }
        if let Some(email) = param(params, "email") {
            ensure_field(fields::is_valid_email(email))?;
            return Ok(Self::Email(email.to_string()));
        }
        Err(ClinicaError::validation(
            "At least one of cnp, last_name and first_name, phone_number, or email should be provided",
        ))
    }

    // Stored patients use camelCase field names
    fn filter(&self) -> Filter {
        match self {
            Self::Cnp(cnp) => Filter::new().eq("cnp", cnp.as_str()),
            Self::Name {
                last_name,
                first_name,
            } => Filter::new()
                .eq("lastName", last_name.as_str())
                .eq("firstName", first_name.as_str()),
            Self::PhoneNumber(phone_number) => {
                Filter::new().eq("phoneNumber", phone_number.as_str())
            }
            Self::Email(email) => Filter::new().eq("email", email.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PatientChange {
    Name { last_name: String, first_name: String },
    Email(String),
    PhoneNumber(String),
    AgeAndBirthday { age: i32, birthday: String },
    IsActive(bool),
}

impl PatientChange {
    fn is_valid(&self) -> bool {
        match self {
            Self::Name {
                last_name,
                first_name,
            } => fields::is_valid_name(last_name) && fields::is_valid_name(first_name),
            Self::Email(email) => fields::is_valid_email(email),
            Self::PhoneNumber(phone_number) => fields::is_valid_phone_number(phone_number),
            Self::AgeAndBirthday { age, birthday } => {
                fields::is_valid_age(*age) && fields::is_valid_date(birthday)
            }
            Self::IsActive(is_active) => fields::is_valid_is_active(*is_active),
        }
    }
}

/// Register a patient. The cnp is the key, so a used cnp is a conflict like
/// any other unique field.
pub fn create<S: RecordStore>(store: &S, new: NewPatient) -> Result<Patient> {
    ensure_valid(&new, Patient::KIND)?;
    ensure_unique::<Patient, S>(
        store,
        &[
            ("cnp", new.cnp.as_str()),
            ("email", new.email.as_str()),
            ("phoneNumber", new.phone_number.as_str()),
        ],
        None,
    )?;

    let patient = store.insert(Patient::from(new))?;
    tracing::info!(cnp = %patient.cnp, "Patient created");
    Ok(patient)
}

pub fn get<S: RecordStore>(store: &S, cnp: &str) -> Result<Patient> {
    require(store, cnp)
}

pub fn search<S: RecordStore>(store: &S, query: &PatientQuery) -> Result<Vec<Patient>> {
    find_matching(store, &query.filter())
}

pub fn update<S: RecordStore>(store: &S, cnp: &str, change: PatientChange) -> Result<()> {
    ensure_field(change.is_valid())?;
    let mut patient: Patient = require(store, cnp)?;

    match change {
        PatientChange::Name {
            last_name,
            first_name,
        } => {
            patient.last_name = last_name;
            patient.first_name = first_name;
        }
        PatientChange::Email(email) => {
            ensure_unique::<Patient, S>(store, &[("email", email.as_str())], Some(cnp))?;
            patient.email = email;
        }
        PatientChange::PhoneNumber(phone_number) => {
            ensure_unique::<Patient, S>(store, &[("phoneNumber", phone_number.as_str())], Some(cnp))?;
            patient.phone_number = phone_number;
        }
        PatientChange::AgeAndBirthday { age, birthday } => {
            patient.age = age;
            patient.birthday = birthday;
        }
        PatientChange::IsActive(is_active) => patient.is_active = is_active,
    }

    save(store, &patient)
}

pub fn delete<S: RecordStore>(store: &S, cnp: &str) -> Result<()> {
    remove::<Patient, S>(store, cnp)
}
