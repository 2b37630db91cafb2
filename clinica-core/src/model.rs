//! Domain records and inbound payloads
//!
//! Stored records carry their key; `New*` payloads are what clients send on
//! create and never carry a generated key.

use serde::{Deserialize, Serialize};

use crate::store::{Filter, Record};

/// Registered user of the practice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub user_name: String,
    pub user_email: String,
    /// PHC-like string produced by [`crate::password::PasswordHasher`]
    pub password_hash: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub last_name: String,
    pub first_name: String,
    pub user_name: String,
    pub user_email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub speciality: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDoctor {
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub speciality: String,
}

/// Patient, keyed by CNP
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub cnp: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub age: i32,
    pub birthday: String,
    pub is_active: bool,
}

/// Patient registration payload. `is_active` is not accepted: new patients
/// always start active.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPatient {
    pub cnp: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    pub email: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    pub age: i32,
    pub birthday: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    /// CNP of the patient
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub status: String,
}

/// Consultation document. `id` is internal to the document store; callers
/// address consultations through [`ConsultationKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consultation {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub diagnostic: String,
    pub investigations: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConsultation {
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub diagnostic: String,
    pub investigations: String,
}

/// Natural key of a consultation.
///
/// Two consultations with the same key cannot be told apart, so creation
/// rejects a key that is already present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationKey {
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub diagnostic: String,
}

impl ConsultationKey {
    /// Equality filter selecting every document with this key
    pub fn filter(&self) -> Filter {
        Filter::new()
            .eq("patient_id", self.patient_id.as_str())
            .eq("doctor_id", self.doctor_id)
            .eq("date", self.date.as_str())
            .eq("diagnostic", self.diagnostic.as_str())
    }
}

impl NewAccount {
    pub fn into_account(self, password_hash: String) -> Account {
        Account {
            id: 0,
            last_name: self.last_name,
            first_name: self.first_name,
            user_name: self.user_name,
            user_email: self.user_email,
            password_hash,
        }
    }
}

impl From<NewDoctor> for Doctor {
    fn from(new: NewDoctor) -> Self {
        Self {
            id: 0,
            last_name: new.last_name,
            first_name: new.first_name,
            email: new.email,
            phone_number: new.phone_number,
            speciality: new.speciality,
        }
    }
}

impl From<NewPatient> for Patient {
    fn from(new: NewPatient) -> Self {
        Self {
            cnp: new.cnp,
            last_name: new.last_name,
            first_name: new.first_name,
            email: new.email,
            phone_number: new.phone_number,
            age: new.age,
            birthday: new.birthday,
            is_active: true,
        }
    }
}

impl From<NewAppointment> for Appointment {
    fn from(new: NewAppointment) -> Self {
        Self {
            id: 0,
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            date: new.date,
            status: new.status,
        }
    }
}

impl NewConsultation {
    pub fn key(&self) -> ConsultationKey {
        ConsultationKey {
            patient_id: self.patient_id.clone(),
            doctor_id: self.doctor_id,
            date: self.date.clone(),
            diagnostic: self.diagnostic.clone(),
        }
    }
}

impl Consultation {
    /// Build a document with a fresh internal id
    pub fn new(new: NewConsultation) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            date: new.date,
            diagnostic: new.diagnostic,
            investigations: new.investigations,
        }
    }

    pub fn key(&self) -> ConsultationKey {
        ConsultationKey {
            patient_id: self.patient_id.clone(),
            doctor_id: self.doctor_id,
            date: self.date.clone(),
            diagnostic: self.diagnostic.clone(),
        }
    }
}

impl Record for Account {
    const KIND: &'static str = "Account";
    const FILTERABLE: &'static [&'static str] =
        &["last_name", "first_name", "user_name", "user_email"];

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_key(&mut self, key: i64) {
        self.id = key;
    }
}

impl Record for Doctor {
    const KIND: &'static str = "Doctor";
    const FILTERABLE: &'static [&'static str] =
        &["last_name", "first_name", "email", "phone_number", "speciality"];

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_key(&mut self, key: i64) {
        self.id = key;
    }
}

impl Record for Patient {
    const KIND: &'static str = "Patient";
    const FILTERABLE: &'static [&'static str] =
        &["cnp", "lastName", "firstName", "email", "phoneNumber"];
    const GENERATED_KEY: bool = false;

    fn key(&self) -> String {
        self.cnp.clone()
    }
}

impl Record for Appointment {
    const KIND: &'static str = "Appointment";
    const FILTERABLE: &'static [&'static str] = &["patient_id", "doctor_id", "date", "status"];

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_key(&mut self, key: i64) {
        self.id = key;
    }
}
