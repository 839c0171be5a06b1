use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use caretrack_data::models::{Medication, Patient, Reading};
use caretrack_data::query::Pagination;
use caretrack_domain::analysis::Classification;
use caretrack_domain::auth::authorize::RoleError;
use caretrack_domain::services::ServiceError;

/// Standard response envelope. Every endpoint wraps its payload in this
/// shape so clients can branch on `success` alone.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    PatientEnvelope = Envelope<Patient>,
    PatientListEnvelope = Envelope<Vec<Patient>>,
    MedicationEnvelope = Envelope<Medication>,
    MedicationListEnvelope = Envelope<Vec<Medication>>,
    ReadingEnvelope = Envelope<Reading>,
    ReadingListEnvelope = Envelope<Vec<Reading>>,
    AnalysisEnvelope = Envelope<Classification>
)]
pub struct Envelope<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful single-document response
    pub fn of(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            pagination: None,
            message: None,
        }
    }
}

impl Envelope<Vec<Value>> {
    /// Successful list response with item count and page links
    pub fn list(data: Vec<Value>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data: Some(data),
            pagination: Some(pagination),
            message: None,
        }
    }
}

impl Envelope<Value> {
    /// Successful response with an empty document, used by deletes
    pub fn empty() -> Self {
        Envelope::of(Value::Object(Default::default()))
    }

    /// Failure response carrying only a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            pagination: None,
            message: Some(message.into()),
        }
    }
}

/// Error type returned by all handlers, rendered as an error envelope
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => {
                tracing::error!("Internal error: {}", m);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(Envelope::error(message))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(m) => ApiError::BadRequest(m),
            ServiceError::NotFound(m) => ApiError::NotFound(m),
            ServiceError::Unauthorized(m) => ApiError::Unauthorized(m),
            ServiceError::Repository(m) => ApiError::Internal(m),
        }
    }
}

impl From<RoleError> for ApiError {
    fn from(err: RoleError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_shape() {
        let envelope = Envelope::error("Patient not found");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({ "success": false, "message": "Patient not found" })
        );
    }

    #[test]
    fn test_list_envelope_counts_returned_items() {
        let docs = vec![json!({"id": 1}), json!({"id": 2})];
        let envelope = Envelope::list(docs, Pagination::default());
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["count"], json!(2));
        assert_eq!(value["pagination"], json!({}));
    }

    #[test]
    fn test_delete_envelope_has_empty_document() {
        let value = serde_json::to_value(Envelope::empty()).unwrap();
        assert_eq!(value["data"], json!({}));
    }
}
