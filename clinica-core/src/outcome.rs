use serde::Serialize;

use crate::error::ClinicaError;
use crate::links::Links;

/// Error body returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct ApiMessage {
    pub detail: String,
    pub code: String,
    #[serde(rename = "_links", skip_serializing_if = "Links::is_empty")]
    pub links: Links,
}

impl ApiMessage {
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
            links: Links::new(),
        }
    }

    /// Create a not found message
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::new("not-found", format!("{} not found: {}", kind, id))
    }

    /// Create a storage error message
    pub fn storage_error(detail: impl Into<String>) -> Self {
        Self::new("storage", detail)
    }

    /// Create a malformed request message
    pub fn invalid_request(detail: impl Into<String>) -> Self {
        Self::new("invalid-request", detail)
    }

    /// Attach hyperlinks
    pub fn with_links(mut self, links: Links) -> Self {
        self.links = links;
        self
    }
}

impl From<&ClinicaError> for ApiMessage {
    fn from(err: &ClinicaError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::collection_links;

    #[test]
    fn test_message_serialization() {
        let message = ApiMessage::not_found("Patient", "123");
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("Patient not found: 123"));
        assert!(json.contains("not-found"));
        assert!(!json.contains("_links"));
    }

    #[test]
    fn test_from_error() {
        let message = ApiMessage::from(&ClinicaError::validation("bad cnp"));
        assert_eq!(message.code, "validation");
        assert!(message.detail.contains("bad cnp"));
    }

    #[test]
    fn test_with_links() {
        let message = ApiMessage::new("validation", "rejected")
            .with_links(collection_links("doctors", "doctor"));
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["_links"]["view doctors"]["type"], "GET");
    }
}
