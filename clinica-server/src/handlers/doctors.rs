use axum::extract::{Path, Query, Request, State};
use clinica_core::service::Params;
use clinica_core::service::doctors::{self, DoctorChange, DoctorQuery};
use clinica_core::{ClinicaError, Doctor, NewDoctor, Record};
use clinica_store::Operation;
use serde_json::Value;
use std::sync::Arc;

use super::{
    HandlerResult, applied, create_error, created, error_response, extract_body, found, listed,
    record_id, text, unknown_field,
};
use crate::AppState;
use crate::audit::{self, AuditContext};

/// Create doctor (POST /doctors)
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<NewDoctor>(request)
        .await
        .and_then(|new| doctors::create(&state.records, new));

    let id = result.as_ref().ok().map(|doctor| doctor.id.to_string());
    audit::log_outcome(
        &audit_ctx,
        Operation::Create,
        Doctor::KIND,
        id.as_deref(),
        &result,
        &state.audit,
    );

    match result {
        Ok(doctor) => Ok(created(&doctor)),
        Err(e) => Err(create_error::<Doctor>(&e, "doctor")),
    }
}

/// Read doctor (GET /doctors/{id})
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| doctors::get(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Read,
        Doctor::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    result.map(|doctor| found(&doctor)).map_err(|e| error_response(&e))
}

/// Search doctors (GET /doctors?speciality=...)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result =
        DoctorQuery::from_params(&params).and_then(|query| doctors::search(&state.records, &query));
    audit::log_outcome(
        &audit_ctx,
        Operation::List,
        Doctor::KIND,
        None,
        &result,
        &state.audit,
    );

    result
        .map(|matches| listed(&matches))
        .map_err(|e| error_response(&e))
}

fn parse_change(field: &str, body: &Value) -> Result<DoctorChange, ClinicaError> {
    Ok(match field {
        "name" => DoctorChange::Name {
            last_name: text(body, "last_name")?,
            first_name: text(body, "first_name")?,
        },
        "email" => DoctorChange::Email(text(body, "email")?),
        "phone_number" => DoctorChange::PhoneNumber(text(body, "phone_number")?),
        "speciality" => DoctorChange::Speciality(text(body, "speciality")?),
        other => return Err(unknown_field(other)),
    })
}

/// Update one doctor field group (PUT /doctors/{id}/{field})
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
            record_id(&id).and_then(|id| doctors::update(&state.records, id, change))
        });
    audit::log_outcome(
        &audit_ctx,
        Operation::Update,
        Doctor::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}

/// Delete doctor (DELETE /doctors/{id})
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| doctors::delete(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Delete,
        Doctor::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_name_needs_both_parts() {
        let err = parse_change("name", &json!({"last_name": "Ionescu"})).unwrap_err();
        assert!(matches!(err, ClinicaError::Validation { .. }));

        let change =
            parse_change("name", &json!({"last_name": "Ionescu", "first_name": "Ana"})).unwrap();
        assert!(matches!(change, DoctorChange::Name { .. }));
    }
}
