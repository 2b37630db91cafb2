use axum::extract::{Path, Query, Request, State};
use clinica_core::service::Params;
use clinica_core::service::accounts::{self, AccountChange, AccountQuery};
use clinica_core::{Account, ClinicaError, NewAccount, Record};
use clinica_store::Operation;
use serde_json::Value;
use std::sync::Arc;

use super::{
    HandlerResult, applied, create_error, created, error_response, extract_body, found, listed,
    record_id, text, unknown_field,
};
use crate::AppState;
use crate::audit::{self, AuditContext};

/// Register account (POST /accounts)
pub async fn create(State(state): State<Arc<AppState>>, request: Request) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = extract_body::<NewAccount>(request)
        .await
        .and_then(|new| accounts::register(&state.records, &state.hasher, new));

    let id = result.as_ref().ok().map(|account| account.id.to_string());
    audit::log_outcome(
        &audit_ctx,
        Operation::Create,
        Account::KIND,
        id.as_deref(),
        &result,
        &state.audit,
    );

    match result {
        Ok(account) => Ok(created(&account)),
        Err(e) => Err(create_error::<Account>(&e, "account")),
    }
}

/// Read account (GET /accounts/{id})
pub async fn read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| accounts::get(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Read,
        Account::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    result.map(|account| found(&account)).map_err(|e| error_response(&e))
}

/// Search accounts (GET /accounts?user_name=...)
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Params>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = AccountQuery::from_params(&params)
        .and_then(|query| accounts::search(&state.records, &query));
    audit::log_outcome(
        &audit_ctx,
        Operation::List,
        Account::KIND,
        None,
        &result,
        &state.audit,
    );

    result
        .map(|matches| listed(&matches))
        .map_err(|e| error_response(&e))
}

fn parse_change(field: &str, body: &Value) -> Result<AccountChange, ClinicaError> {
    Ok(match field {
        "last_name" => AccountChange::LastName(text(body, "last_name")?),
        "first_name" => AccountChange::FirstName(text(body, "first_name")?),
        "user_name" => AccountChange::UserName(text(body, "user_name")?),
        "user_email" => AccountChange::UserEmail(text(body, "user_email")?),
        "password" => AccountChange::Password {
            current: text(body, "current_password")?,
            new: text(body, "new_password")?,
        },
        other => return Err(unknown_field(other)),
    })
}

/// Update one account field (PUT /accounts/{id}/{field})
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
            record_id(&id).and_then(|id| accounts::update(&state.records, &state.hasher, id, change))
        });
    audit::log_outcome(
        &audit_ctx,
        Operation::Update,
        Account::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}

/// Delete account (DELETE /accounts/{id})
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    request: Request,
) -> HandlerResult {
    let audit_ctx = AuditContext::from_request(&request);
    let result = record_id(&id).and_then(|id| accounts::delete(&state.records, id));
    audit::log_outcome(
        &audit_ctx,
        Operation::Delete,
        Account::KIND,
        Some(&id),
        &result,
        &state.audit,
    );

    applied(&result)
}
