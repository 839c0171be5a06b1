// Services that implement business logic over the repositories.

mod medication;
mod patient;
mod reading;

pub use medication::{
    create_default_medication_service, MedicationService, MedicationServiceTrait,
};
pub use patient::{create_default_patient_service, PatientService, PatientServiceTrait};
pub use reading::{create_default_reading_service, ReadingService, ReadingServiceTrait};

use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::auth::UserInfo;
use caretrack_data::repository::RepositoryError;

/// Shared error type for the resource services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found
    #[error("{0}")]
    NotFound(String),

    /// Caller is not allowed to perform the operation
    #[error("{0}")]
    Unauthorized(String),

    /// Repository failure
    #[error("Repository error: {0}")]
    Repository(String),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(entity, id) => {
                ServiceError::NotFound(format!("{} not found: {}", entity, id))
            }
            RepositoryError::Validation(message) => ServiceError::Validation(message),
            RepositoryError::Query(e) => ServiceError::Validation(e.to_string()),
            RepositoryError::Store(e) => ServiceError::Repository(e.to_string()),
        }
    }
}

/// Flatten validator errors into one readable message
pub(crate) fn validation_message(errors: ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(message) => message.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect::<Vec<String>>()
        .join("; ")
}

/// Parse the caller's user id out of the authenticated identity
pub(crate) fn caller_uuid(caller: &UserInfo) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(&caller.user_id)
        .map_err(|_| ServiceError::Unauthorized("Caller identity is not a valid user id".to_string()))
}
