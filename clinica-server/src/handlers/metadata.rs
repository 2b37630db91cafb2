use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{Map, Value, json};
use std::sync::Arc;

use crate::AppState;

/// Health check (GET /health)
///
/// Reports stored record counts; a store that cannot be read turns the check
/// into a 503.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let records = state.records.count_by_kind();
    let consultations = state.documents.count();

    match (records, consultations) {
        (Ok(records), Ok(consultations)) => {
            let mut counts: Map<String, Value> = records
                .into_iter()
                .map(|(kind, count)| (kind, json!(count)))
                .collect();
            counts.insert("Consultation".to_string(), json!(consultations));
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "version": env!("CARGO_PKG_VERSION"),
                    "counts": counts,
                })),
            )
        }
        (records, consultations) => {
            let error = records
                .err()
                .map(|e| e.to_string())
                .or_else(|| consultations.err().map(|e| e.to_string()))
                .unwrap_or_default();
            tracing::error!(error = %error, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unavailable",
                    "version": env!("CARGO_PKG_VERSION"),
                    "error": error,
                })),
            )
        }
    }
}
