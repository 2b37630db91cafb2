use axum::extract::{Path, Query, Request, State};
use clinica_core::service::Params;
use clinica_core::service::consultations::{self, ConsultationQuery, ConsultationUpdate};
use clinica_core::{ClinicaError, Consultation, ConsultationKey, NewConsultation};
use clinica_store::Operation;
use std::sync::Arc;

use super::{
    HandlerResult, applied, create_error, created, error_response, extract_body, found, listed,
    record_id,
};
use crate::AppState;
use crate::audit::{self, AuditContext};

const KIND: &str = "Consultation";

/// `/consultations/{patient_id}/{doctor_id}/{date}/{diagnostic}`
type KeyPath = Path<(String, String, String, String)>;

fn key_from_path(
    Path((patient_id, doctor_id, date, diagnostic)): KeyPath,
) -> Result<ConsultationKey, ClinicaError> {
    Ok(ConsultationKey {
        patient_id,
        doctor_id: record_id(&doctor_id)?,
        date,
        diagnostic,
    })
}

/// Audit id of a key path, readable even when the key did not parse
fn describe_path(Path((patient_id, doctor_id, date, diagnostic)): &KeyPath) -> String {
    format!("{}/{}/{}/{}", patient_id, doctor_id, date, diagnostic)
}

fn describe(key: &ConsultationKey) -> String {
    format!(
        "{}/{}/{}/{}",
        key.patient_id, key.doctor_id, key.date, key.diagnostic
    )
}

/// Record consultation (POST /consultations)
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<NewConsultation>(request)
        .await
        .and_then(|new| consultations::create(&state.records, &state.documents, new));

    let key = result.as_ref().ok().map(|c| describe(&c.key()));
    audit::log_outcome(
        &audit_ctx,
        Operation::Create,
        KIND,
        key.as_deref(),
        &result,
        &state.audit,
    );

    match result {
        Ok(consultation) => Ok(created(&consultation)),
        Err(e) => Err(create_error::<Consultation>(&e, "consultation")),
    }
}

/// Read consultation by natural key
pub async fn read(
    State(state): State<Arc<AppState>>,
    path: KeyPath,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let id = describe_path(&path);
    let result = key_from_path(path)
        .and_then(|key| consultations::get(&state.records, &state.documents, &key));
    audit::log_outcome(
        &audit_ctx,
        Operation::Read,
        KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    result
        .map(|consultation| found(&consultation))
        .map_err(|e| error_response(&e))
}

/// List consultations, oldest first (GET /consultations[?patient_id=|doctor_id=|date=|diagnostic=])
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = ConsultationQuery::from_params(&params)
        .and_then(|query| consultations::list(&state.records, &state.documents, &query));
    audit::log_outcome(&audit_ctx, Operation::List, KIND, None, &result, &state.audit);

    result
        .map(|matches| listed(&matches))
        .map_err(|e| error_response(&e))
}

/// Replace a consultation's key and investigations (PUT /consultations)
pub async fn update(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let change = extract_body::<ConsultationUpdate>(request).await;
    let existing = change.as_ref().ok().map(|c| describe(&c.existing));
    let result =
        change.and_then(|change| consultations::update(&state.records, &state.documents, change));
    audit::log_outcome(
        &audit_ctx,
        Operation::Update,
        KIND,
        existing.as_deref(),
        &result,
        &state.audit,
    );

    applied(&result)
}

/// Delete consultation by natural key
pub async fn delete(
    State(state): State<Arc<AppState>>,
    path: KeyPath,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let id = describe_path(&path);
    let result = key_from_path(path)
        .and_then(|key| consultations::delete(&state.records, &state.documents, &key));
    audit::log_outcome(
        &audit_ctx,
        Operation::Delete,
        KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}
