pub mod accounts;
pub mod appointments;
pub mod consultations;
pub mod doctors;
pub mod metadata;
pub mod patients;

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use clinica_core::{ApiMessage, ClinicaError, Shape, collection_links, shape, shape_all};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use serde_json::error::Category;

pub type HandlerError = (StatusCode, Json<Value>);
pub type HandlerResult = Result<Response, HandlerError>;

/// HTTP status for a service failure
pub fn status_for(err: &ClinicaError) -> StatusCode {
    match err {
        ClinicaError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ClinicaError::Conflict(_) | ClinicaError::InvalidJson(_) => StatusCode::BAD_REQUEST,
        ClinicaError::Duplicate { .. } => StatusCode::CONFLICT,
        ClinicaError::NotFound { .. } => StatusCode::NOT_FOUND,
        ClinicaError::NotModified { .. } => StatusCode::NOT_MODIFIED,
        ClinicaError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        ClinicaError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &ClinicaError) -> HandlerError {
    (status_for(err), Json(json!(ApiMessage::from(err))))
}

/// Rejected create. Validation failures point the client at the collection.
pub fn create_error<E: Shape>(err: &ClinicaError, label: &str) -> HandlerError {
    let mut message = ApiMessage::from(err);
    if matches!(err, ClinicaError::Validation { .. }) {
        message = message.with_links(collection_links(E::COLLECTION, label));
    }
    (status_for(err), Json(json!(message)))
}

/// Read and deserialize a JSON body.
///
/// Malformed JSON is a bad request; well-formed JSON of the wrong shape is a
/// validation failure.
pub async fn extract_body<T: DeserializeOwned>(request: Request) -> Result<T, ClinicaError> {
    let bytes = request
        .into_body()
        .collect()
        .await
        .map_err(|e| ClinicaError::validation(format!("Request body could not be read: {}", e)))?
        .to_bytes();

    serde_json::from_slice(&bytes).map_err(|e| match e.classify() {
        Category::Data => ClinicaError::validation(e.to_string()),
        _ => ClinicaError::InvalidJson(e),
    })
}

pub fn created<E: Shape>(entity: &E) -> Response {
    (StatusCode::CREATED, Json(shape(entity))).into_response()
}

pub fn found<E: Shape>(entity: &E) -> Response {
    (StatusCode::OK, Json(shape(entity))).into_response()
}

pub fn listed<E: Shape>(entities: &[E]) -> Response {
    (StatusCode::OK, Json(shape_all(entities))).into_response()
}

/// Outcome of an update or delete: 204, or 304 without a body
pub fn applied(result: &Result<(), ClinicaError>) -> HandlerResult {
    match result {
        Ok(()) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(ClinicaError::NotModified { .. }) => Ok(StatusCode::NOT_MODIFIED.into_response()),
        Err(e) => Err(error_response(e)),
    }
}

/// Generated integer key taken from a path segment
pub fn record_id(raw: &str) -> Result<i64, ClinicaError> {
    raw.parse()
        .map_err(|_| ClinicaError::validation(format!("Invalid id: {}", raw)))
}

/// Field update endpoint that does not exist for this kind
pub fn unknown_field(field: &str) -> ClinicaError {
    ClinicaError::not_found("Update field", field)
}

/// Required string member of an update body
pub fn text(body: &Value, name: &str) -> Result<String, ClinicaError> {
    body.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClinicaError::validation(format!("Missing string field: {}", name)))
}

/// Required integer member of an update body
pub fn integer(body: &Value, name: &str) -> Result<i64, ClinicaError> {
    body.get(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| ClinicaError::validation(format!("Missing integer field: {}", name)))
}

/// Required boolean member of an update body
pub fn flag(body: &Value, name: &str) -> Result<bool, ClinicaError> {
    body.get(name)
        .and_then(Value::as_bool)
        .ok_or_else(|| ClinicaError::validation(format!("Missing boolean field: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use clinica_core::{Doctor, NewDoctor};

    fn request(body: &str) -> Request {
        Request::builder().body(Body::from(body.to_string())).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ClinicaError::validation("x")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ClinicaError::not_found("Doctor", 1)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ClinicaError::Duplicate {
                kind: "Consultation".to_string(),
                message: "x".to_string()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ClinicaError::Storage("disk".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_create_error_links_only_on_validation() {
        let (status, Json(body)) =
            create_error::<Doctor>(&ClinicaError::validation("bad"), "doctor");
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["_links"]["add new doctor"]["type"], "POST");

        let (status, Json(body)) =
            create_error::<Doctor>(&ClinicaError::not_found("Patient", "x"), "doctor");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("_links").is_none());
    }

    #[tokio::test]
    async fn test_extract_body_classifies_errors() {
        let err = extract_body::<NewDoctor>(request("{not json")).await.unwrap_err();
        assert!(matches!(err, ClinicaError::InvalidJson(_)));

        let err = extract_body::<NewDoctor>(request(r#"{"last_name":"Ionescu"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ClinicaError::Validation { .. }));
    }

    #[test]
    fn test_applied() {
        assert_eq!(applied(&Ok(())).unwrap().status(), StatusCode::NO_CONTENT);
        assert_eq!(
            applied(&Err(ClinicaError::not_modified("same")))
                .unwrap()
                .status(),
            StatusCode::NOT_MODIFIED
        );
        assert!(applied(&Err(ClinicaError::not_found("Doctor", 1))).is_err());
    }

    #[test]
    fn test_record_id() {
        assert_eq!(record_id("42").unwrap(), 42);
        let err = record_id("abc").unwrap_err();
        assert_eq!(status_for(&err), StatusCode::UNPROCESSABLE_ENTITY);
        let (_, Json(body)) = error_response(&err);
        assert_eq!(body["code"], "validation");
        assert!(body["detail"].as_str().unwrap().contains("abc"));
    }

    #[test]
    fn test_body_members() {
        let body = json!({"age": 30, "birthday": "1994-01-01", "is_active": false});
        assert_eq!(integer(&body, "age").unwrap(), 30);
        assert_eq!(text(&body, "birthday").unwrap(), "1994-01-01");
        assert!(!flag(&body, "is_active").unwrap());
        assert!(text(&body, "age").is_err());
    }
}
