use axum::extract::{Path, Query, Request, State};
use clinica_core::service::Params;
use clinica_core::service::patients::{self, PatientChange, PatientQuery};
use clinica_core::{ClinicaError, NewPatient, Patient, Record};
use clinica_store::Operation;
use serde_json::Value;
use std::sync::Arc;

use super::{
    HandlerResult, applied, create_error, created, error_response, extract_body, flag, found,
    integer, listed, text, unknown_field,
};
use crate::AppState;
use crate::audit::{self, AuditContext};

/// Register patient (POST /patients)
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<NewPatient>(request)
        .await
        .and_then(|new| patients::create(&state.records, new));

    let cnp = result.as_ref().ok().map(|patient| patient.cnp.clone());
    audit::log_outcome(
        &audit_ctx,
        Operation::Create,
        Patient::KIND,
        cnp.as_deref(),
        &result,
        &state.audit,
    );

    match result {
        Ok(patient) => Ok(created(&patient)),
        Err(e) => Err(create_error::<Patient>(&e, "patient")),
    }
}

/// Read patient (GET /patients/{cnp})
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(cnp): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = patients::get(&state.records, &cnp);
    audit::log_outcome(
        &audit_ctx,
        Operation::Read,
        Patient::KIND,
        Some(&cnp),
        &result,
        &state.audit,
    );

    result.map(|patient| found(&patient)).map_err(|e| error_response(&e))
}

/// Search patients (GET /patients?cnp=...)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = PatientQuery::from_params(&params)
        .and_then(|query| patients::search(&state.records, &query));
    audit::log_outcome(
        &audit_ctx,
        Operation::List,
        Patient::KIND,
        None,
        &result,
        &state.audit,
    );

    result
        .map(|matches| listed(&matches))
        .map_err(|e| error_response(&e))
}

fn parse_change(field: &str, body: &Value) -> Result<PatientChange, ClinicaError> {
    Ok(match field {
        "name" => PatientChange::Name {
            last_name: text(body, "last_name")?,
            first_name: text(body, "first_name")?,
        },
        "email" => PatientChange::Email(text(body, "email")?),
        "phone_number" => PatientChange::PhoneNumber(text(body, "phone_number")?),
        "age_and_birthday" => {
            let age = integer(body, "age")?;
            PatientChange::AgeAndBirthday {
                age: i32::try_from(age)
                    .map_err(|_| ClinicaError::validation("Validation error in input data"))?,
                birthday: text(body, "birthday")?,
            }
        }
        "is_active" => PatientChange::IsActive(flag(body, "is_active")?),
        other => return Err(unknown_field(other)),
    })
}

/// Update one patient field group (PUT /patients/{cnp}/{field})
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((cnp, field)): Path<(String, String)>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<Value>(request)
        .await
        .and_then(|body| parse_change(&field, &body))
        .and_then(|change| patients::update(&state.records, &cnp, change));
    audit::log_outcome(
        &audit_ctx,
        Operation::Update,
        Patient::KIND,
        Some(&cnp),
        &result,
        &state.audit,
    );

    applied(&result)
}

/// Delete patient (DELETE /patients/{cnp})
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(cnp): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = patients::delete(&state.records, &cnp);
    audit::log_outcome(
        &audit_ctx,
        Operation::Delete,
        Patient::KIND,
        Some(&cnp),
        &result,
        &state.audit,
    );

    applied(&result)
}
