use super::{Params, find_matching, param, remove, require, save};
use crate::error::{ClinicaError, Result};
use crate::model::{Appointment, Doctor, NewAppointment, Patient};
use crate::store::{Filter, Record, RecordStore};
use crate::validation::{ensure_field, ensure_valid, fields};

/// Optional appointment filters; all given filters must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub patient_id: Option<String>,
    pub doctor_id: Option<i64>,
    pub status: Option<String>,
}

impl AppointmentQuery {
    pub fn from_params(params: &Params) -> Result<Self> {
        let doctor_id = match param(params, "doctor_id") {
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| ClinicaError::validation(format!("Invalid doctor_id: {}", raw)))?,
            ),
            None => None,
        };
        let status = param(params, "status");
        if let Some(status) = status {
            ensure_field(fields::is_valid_status(status))?;
        }
        Ok(Self {
            patient_id: param(params, "patient_id").map(str::to_string),
            doctor_id,
            status: status.map(str::to_string),
        })
    }

    fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(patient_id) = &self.patient_id {
            filter = filter.eq("patient_id", patient_id.as_str());
        }
        if let Some(doctor_id) = self.doctor_id {
            filter = filter.eq("doctor_id", doctor_id);
        }
        if let Some(status) = &self.status {
            filter = filter.eq("status", status.as_str());
        }
        filter
    }
}

#[derive(Debug, Clone)]
pub enum AppointmentChange {
    PatientId(String),
    DoctorId(i64),
    Date(String),
    Status(String),
}

fn require_patient<S: RecordStore>(store: &S, cnp: &str) -> Result<()> {
    require::<Patient, S>(store, cnp).map(|_| ())
}

fn require_doctor<S: RecordStore>(store: &S, id: i64) -> Result<()> {
    require::<Doctor, S>(store, &id.to_string()).map(|_| ())
}

/// Book an appointment between an existing patient and doctor
pub fn create<S: RecordStore>(store: &S, new: NewAppointment) -> Result<Appointment> {
    ensure_valid(&new, Appointment::KIND)?;
    require_patient(store, &new.patient_id)?;
    require_doctor(store, new.doctor_id)?;

    let appointment = store.insert(Appointment::from(new))?;
    tracing::info!(
        id = appointment.id,
        doctor_id = appointment.doctor_id,
        "Appointment created"
    );
    Ok(appointment)
}

pub fn get<S: RecordStore>(store: &S, id: i64) -> Result<Appointment> {
    require(store, &id.to_string())
}

pub fn list<S: RecordStore>(store: &S, query: &AppointmentQuery) -> Result<Vec<Appointment>> {
    find_matching(store, &query.filter())
}

/// Apply a single-field change.
///
/// Setting the status it already has is reported as not modified and nothing
/// is written. Re-pointing to another patient or doctor requires it to exist.
pub fn update<S: RecordStore>(store: &S, id: i64, change: AppointmentChange) -> Result<()> {
    match &change {
        AppointmentChange::Date(date) => ensure_field(fields::is_valid_date(date))?,
        AppointmentChange::Status(status) => ensure_field(fields::is_valid_status(status))?,
        AppointmentChange::PatientId(_) | AppointmentChange::DoctorId(_) => {}
    }

    let mut appointment: Appointment = require(store, &id.to_string())?;

    match change {
        AppointmentChange::PatientId(patient_id) => {
            require_patient(store, &patient_id)?;
            appointment.patient_id = patient_id;
        }
        AppointmentChange::DoctorId(doctor_id) => {
            require_doctor(store, doctor_id)?;
            appointment.doctor_id = doctor_id;
        }
        AppointmentChange::Date(date) => appointment.date = date,
        AppointmentChange::Status(status) => {
            if appointment.status == status {
                return Err(ClinicaError::not_modified(format!(
                    "Appointment {} already has status {}",
                    id, status
                )));
            }
            appointment.status = status;
        }
    }

    save(store, &appointment)
}

pub fn delete<S: RecordStore>(store: &S, id: i64) -> Result<()> {
    remove::<Appointment, S>(store, &id.to_string())
}
