//! Consultations live in the document store but reference patients and
//! doctors held by the record store, so every operation takes both.

use chrono::NaiveDate;
use serde::Deserialize;

use super::{Params, param, require};
use crate::error::{ClinicaError, Result};
use crate::model::{Consultation, ConsultationKey, Doctor, NewConsultation, Patient};
use crate::store::{DocumentStore, Filter, RecordStore};
use crate::validation::{Validate, ensure_field, ensure_valid, fields};

const KIND: &str = "Consultation";

/// Consultation listing, at most one criterion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsultationQuery {
    All,
    Patient(String),
    Doctor(i64),
    Date(String),
    Diagnostic(String),
}

impl ConsultationQuery {
    pub fn from_params(params: &Params) -> Result<Self> {
        if let Some(patient_id) = param(params, "patient_id") {
            return Ok(Self::Patient(patient_id.to_string()));
        }
        if let Some(raw) = param(params, "doctor_id") {
            let doctor_id = raw
                .parse::<i64>()
                .map_err(|_| ClinicaError::validation(format!("Invalid doctor_id: {}", raw)))?;
            return Ok(Self::Doctor(doctor_id));
        }
        if let Some(date) = param(params, "date") {
            ensure_field(fields::is_valid_date(date))?;
            return Ok(Self::Date(date.to_string()));
        }
        if let Some(diagnostic) = param(params, "diagnostic") {
            ensure_field(fields::is_valid_diagnostic(diagnostic))?;
            return Ok(Self::Diagnostic(diagnostic.to_string()));
        }
        Ok(Self::All)
    }

    fn filter(&self) -> Filter {
        match self {
            Self::All => Filter::new(),
            Self::Patient(patient_id) => Filter::new().eq("patient_id", patient_id.as_str()),
            Self::Doctor(doctor_id) => Filter::new().eq("doctor_id", *doctor_id),
            Self::Date(date) => Filter::new().eq("date", date.as_str()),
            Self::Diagnostic(diagnostic) => Filter::new().eq("diagnostic", diagnostic.as_str()),
        }
    }
}

/// Replacement values of a consultation update. Investigations left out keep
/// their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsultationChange {
    pub patient_id: String,
    pub doctor_id: i64,
    pub date: String,
    pub diagnostic: String,
    pub investigations: Option<String>,
}

impl ConsultationChange {
    pub fn key(&self) -> ConsultationKey {
        ConsultationKey {
            patient_id: self.patient_id.clone(),
            doctor_id: self.doctor_id,
            date: self.date.clone(),
            diagnostic: self.diagnostic.clone(),
        }
    }
}

/// Body of a consultation update: the key to look up and its replacement
#[derive(Debug, Clone, Deserialize)]
pub struct ConsultationUpdate {
    pub existing: ConsultationKey,
    pub new: ConsultationChange,
}

fn require_references<R: RecordStore>(records: &R, patient_id: &str, doctor_id: i64) -> Result<()> {
    require::<Patient, R>(records, patient_id)?;
    require::<Doctor, R>(records, &doctor_id.to_string())?;
    Ok(())
}

fn describe(key: &ConsultationKey) -> String {
    format!(
        "{}/{}/{}/{}",
        key.patient_id, key.doctor_id, key.date, key.diagnostic
    )
}

fn find_by_key<D: DocumentStore>(documents: &D, key: &ConsultationKey) -> Result<Consultation> {
    documents
        .find_consultations(&key.filter())?
        .into_iter()
        .next()
        .ok_or_else(|| ClinicaError::not_found(KIND, describe(key)))
}

fn sort_by_date(consultations: &mut [Consultation]) {
    consultations.sort_by_key(|consultation| {
        NaiveDate::parse_from_str(&consultation.date, fields::DATE_FORMAT).ok()
    });
}

/// Record a consultation. A second consultation with the same natural key is
/// rejected as a duplicate.
pub fn create<R: RecordStore, D: DocumentStore>(
    records: &R,
    documents: &D,
    new: NewConsultation,
) -> Result<Consultation> {
    ensure_valid(&new, KIND)?;
    require_references(records, &new.patient_id, new.doctor_id)?;

    let key = new.key();
    if !documents.find_consultations(&key.filter())?.is_empty() {
        return Err(ClinicaError::Duplicate {
            kind: KIND.to_string(),
            message: format!("A consultation with these parameters already exists ({})", describe(&key)),
        });
    }

    let consultation = Consultation::new(new);
    documents.insert_consultation(&consultation)?;
    tracing::info!(
        patient_id = %consultation.patient_id,
        doctor_id = consultation.doctor_id,
        date = %consultation.date,
        "Consultation created"
    );
    Ok(consultation)
}

pub fn get<R: RecordStore, D: DocumentStore>(
    records: &R,
    documents: &D,
    key: &ConsultationKey,
) -> Result<Consultation> {
    require_references(records, &key.patient_id, key.doctor_id)?;
    find_by_key(documents, key)
}

/// Matching consultations, oldest first
pub fn list<R: RecordStore, D: DocumentStore>(
    records: &R,
    documents: &D,
    query: &ConsultationQuery,
) -> Result<Vec<Consultation>> {
    match query {
        ConsultationQuery::Patient(patient_id) => {
            require::<Patient, R>(records, patient_id)?;
        }
        ConsultationQuery::Doctor(doctor_id) => {
            require::<Doctor, R>(records, &doctor_id.to_string())?;
        }
        _ => {}
    }

    let mut found = documents.find_consultations(&query.filter())?;
    if found.is_empty() {
        return Err(ClinicaError::not_found(KIND, "no consultations match"));
    }
    sort_by_date(&mut found);
    Ok(found)
}

/// Replace the key, and optionally the investigations, of an existing
/// consultation.
///
/// The internal document id is kept. Resubmitting the stored values is not
/// modified; moving onto a key held by another consultation is a duplicate.
pub fn update<R: RecordStore, D: DocumentStore>(
    records: &R,
    documents: &D,
    change: ConsultationUpdate,
) -> Result<()> {
    let ConsultationUpdate { existing, new } = change;
    let new_key = new.key();
    if !existing.is_valid() || !new_key.is_valid() {
        return Err(ClinicaError::validation(
            "The consultation could not be updated due to errors in the input data",
        ));
    }
    require_references(records, &new.patient_id, new.doctor_id)?;

    let current = find_by_key(documents, &existing)?;
    let investigations = new
        .investigations
        .unwrap_or_else(|| current.investigations.clone());
    if new_key == existing && investigations == current.investigations {
        return Err(ClinicaError::not_modified(
            "To update a consultation you must modify at least a parameter",
        ));
    }
    if new_key != existing
        && documents
            .find_consultations(&new_key.filter())?
            .iter()
            .any(|other| other.id != current.id)
    {
        return Err(ClinicaError::Duplicate {
            kind: KIND.to_string(),
            message: format!("A consultation with these parameters already exists ({})", describe(&new_key)),
        });
    }

    let replacement = Consultation {
        id: current.id,
        patient_id: new.patient_id,
        doctor_id: new.doctor_id,
        date: new.date,
        diagnostic: new.diagnostic,
        investigations,
    };
    if !documents.replace_consultation(&replacement)? {
        return Err(ClinicaError::not_found(KIND, describe(&existing)));
    }
    Ok(())
}

pub fn delete<R: RecordStore, D: DocumentStore>(
    records: &R,
    documents: &D,
    key: &ConsultationKey,
) -> Result<()> {
    ensure_field(key.is_valid())?;
    require_references(records, &key.patient_id, key.doctor_id)?;

    let current = find_by_key(documents, key)?;
    if !documents.delete_consultation(&current.id)? {
        return Err(ClinicaError::not_found(KIND, describe(key)));
    }
    tracing::info!(key = %describe(key), "Consultation deleted");
    Ok(())
}
