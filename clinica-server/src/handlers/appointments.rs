use axum::extract::{Path, Query, Request, State};
use clinica_core::service::Params;
use clinica_core::service::appointments::{self, AppointmentChange, AppointmentQuery};
use clinica_core::{Appointment, ClinicaError, NewAppointment, Record};
use clinica_store::Operation;
use serde_json::Value;
use std::sync::Arc;

use super::{
    HandlerResult, applied, create_error, created, error_response, extract_body, found, integer,
    listed, record_id, text, unknown_field,
};
use crate::AppState;
use crate::audit::{self, AuditContext};

/// Book appointment (POST /appointments)
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<NewAppointment>(request)
        .await
        .and_then(|new| appointments::create(&state.records, new));

    let id = result.as_ref().ok().map(|appointment| appointment.id.to_string());
    audit::log_outcome(
        &audit_ctx,
        Operation::Create,
        Appointment::KIND,
        id.as_deref(),
        &result,
        &state.audit,
    );

    match result {
        Ok(appointment) => Ok(created(&appointment)),
        Err(e) => Err(create_error::<Appointment>(&e, "appointment")),
    }
}

/// Read appointment (GET /appointments/{id})
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| appointments::get(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Read,
        Appointment::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    result
        .map(|appointment| found(&appointment))
        .map_err(|e| error_response(&e))
}

/// List appointments (GET /appointments[?patient_id=&doctor_id=&status=])
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = AppointmentQuery::from_params(&params)
        .and_then(|query| appointments::list(&state.records, &query));
    audit::log_outcome(
        &audit_ctx,
        Operation::List,
        Appointment::KIND,
        None,
        &result,
        &state.audit,
    );

    result
        .map(|matches| listed(&matches))
        .map_err(|e| error_response(&e))
}

fn parse_change(field: &str, body: &Value) -> Result<AppointmentChange, ClinicaError> {
    Ok(match field {
        "patient_id" => AppointmentChange::PatientId(text(body, "patient_id")?),
        "doctor_id" => AppointmentChange::DoctorId(integer(body, "doctor_id")?),
        "date" => AppointmentChange::Date(text(body, "date")?),
        "status" => AppointmentChange::Status(text(body, "status")?),
        other => return Err(unknown_field(other)),
    })
}

/// Update one appointment field (PUT /appointments/{id}/{field})
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((id, field)): Path<(String, String)>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<Value>(request)
        .await
        .and_then(|body| parse_change(&field, &body))
        .and_then(|change| {
            record_id(&id).and_then(|id| appointments::update(&state.records, id, change))
        });
    audit::log_outcome(
        &audit_ctx,
        Operation::Update,
        Appointment::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}

/// Delete appointment (DELETE /appointments/{id})
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| appointments::delete(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Delete,
        Appointment::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}
