use axum::extract::{ConnectInfo, Request};
use clinica_core::ClinicaError;
use clinica_store::{AuditEntry, AuditLog, Operation};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Audit context extracted from HTTP request
#[derive(Debug, Clone)]
pub struct AuditContext {
    pub client_ip: String,
    pub query_string: Option<String>,
}

impl AuditContext {
    /// Create audit context without connection info (for testing)
    pub fn new(client_ip: String) -> Self {
        Self {
            client_ip,
            query_string: None,
        }
    }

    /// Extract audit context from an Axum request
    pub fn from_request(request: &Request) -> Self {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let query_string = request.uri().query().map(str::to_string);

        Self {
            client_ip,
            query_string,
        }
    }

    fn entry(&self, kind: &str, record_id: Option<&str>) -> AuditEntry {
        AuditEntry {
            kind: Some(kind.to_string()),
            record_id: record_id.map(str::to_string),
            query_string: self.query_string.clone(),
            client_ip: Some(self.client_ip.clone()),
            ..Default::default()
        }
    }
}

fn write(audit_log: &Arc<Mutex<AuditLog>>, operation: Operation, entry: AuditEntry) {
    let audit_log = Arc::clone(audit_log);

    // Write to database asynchronously in a spawned task
    tokio::spawn(async move {
        let audit = audit_log.lock().await;
        if let Err(e) = audit.log(operation, &entry) {
            tracing::error!("Failed to write audit log to database: {}", e);
        }
    });
}

/// Log a successful operation
pub fn log_operation_success(
    context: &AuditContext,
    operation: Operation,
    kind: &str,
    record_id: Option<&str>,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    tracing::info!(
        client_ip = %context.client_ip,
        operation = operation.as_str(),
        kind = kind,
        id = record_id.unwrap_or("N/A"),
        status = "success",
        "Audit: {} {}",
        operation.as_str(),
        kind
    );

    write(audit_log, operation, context.entry(kind, record_id));
}

/// Log a failed operation
pub fn log_operation_error(
    context: &AuditContext,
    operation: Operation,
    kind: &str,
    record_id: Option<&str>,
    error: &ClinicaError,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    tracing::warn!(
        client_ip = %context.client_ip,
        operation = operation.as_str(),
        kind = kind,
        id = record_id.unwrap_or("N/A"),
        status = "error",
        code = error.code(),
        "Audit: {} {} failed: {}",
        operation.as_str(),
        kind,
        error
    );

    let mut entry = context.entry(kind, record_id);
    entry.error_code = Some(error.code().to_string());
    entry.error_message = Some(error.to_string());
    write(audit_log, operation, entry);
}

/// Log the outcome of a service call
pub fn log_outcome<T>(
    context: &AuditContext,
    operation: Operation,
    kind: &str,
    record_id: Option<&str>,
    result: &Result<T, ClinicaError>,
    audit_log: &Arc<Mutex<AuditLog>>,
) {
    match result {
        Ok(_) => log_operation_success(context, operation, kind, record_id, audit_log),
        Err(e) => log_operation_error(context, operation, kind, record_id, e, audit_log),
    }
}
