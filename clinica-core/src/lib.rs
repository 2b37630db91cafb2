pub mod error;
pub mod links;
pub mod model;
pub mod outcome;
pub mod password;
pub mod service;
pub mod store;
pub mod uniqueness;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ClinicaError, Result};
pub use links::{API_BASE, Link, Links, Shape, collection_links, shape, shape_all};
pub use model::{
    Account, Appointment, Consultation, ConsultationKey, Doctor, NewAccount, NewAppointment,
    NewConsultation, NewDoctor, NewPatient, Patient,
};
pub use outcome::ApiMessage;
pub use password::PasswordHasher;
pub use store::{DocumentStore, Filter, Record, RecordStore};
pub use uniqueness::Conflict;
