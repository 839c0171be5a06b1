use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{caller_uuid, validation_message, ServiceError};
use crate::auth::UserInfo;
use caretrack_data::models::{CreatePatientRequest, Patient, UpdatePatientRequest};
use caretrack_data::query::ListQuery;
use caretrack_data::repository::{PatientRepository, PatientRepositoryTrait};

/// Trait for patient record operations
#[async_trait]
pub trait PatientServiceTrait {
    /// Create a patient record owned by the caller
    async fn create_patient(
        &self,
        request: CreatePatientRequest,
        caller: &UserInfo,
    ) -> Result<Patient, ServiceError>;

    /// List patient records matching a query
    async fn list_patients(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Patient>, usize), ServiceError>;

    /// Fetch a single patient record
    async fn get_patient(&self, id: Uuid) -> Result<Patient, ServiceError>;

    /// Update a patient record. Only the owning user or an admin may do so.
    async fn update_patient(
        &self,
        id: Uuid,
        changes: UpdatePatientRequest,
        caller: &UserInfo,
    ) -> Result<Patient, ServiceError>;

    /// Delete a patient record. Only the owning user or an admin may do so.
    /// Readings and medications for the patient are not cascaded.
    async fn delete_patient(&self, id: Uuid, caller: &UserInfo) -> Result<(), ServiceError>;
}

/// Patient service for domain logic
pub struct PatientService<R: PatientRepositoryTrait> {
    repository: R,
}

impl<R: PatientRepositoryTrait> PatientService<R> {
    /// Create a new patient service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Owner-or-admin check shared by the mutating operations
    fn ensure_owner_or_admin(&self, patient: &Patient, caller: &UserInfo, action: &str) -> Result<(), ServiceError> {
        let is_owner = Uuid::parse_str(&caller.user_id)
            .map(|id| id == patient.user_id)
            .unwrap_or(false);

        if is_owner || caller.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized(format!(
                "Not authorized to {} this patient",
                action
            )))
        }
    }
}

#[async_trait]
impl<R: PatientRepositoryTrait + Send + Sync> PatientServiceTrait for PatientService<R> {
    async fn create_patient(
        &self,
        request: CreatePatientRequest,
        caller: &UserInfo,
    ) -> Result<Patient, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(e)))?;

        let owner = caller_uuid(caller)?;
        let patient = self.repository.create(request, owner).await?;
        info!("Created patient record {} for user {}", patient.id, owner);
        Ok(patient)
    }

    async fn list_patients(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Patient>, usize), ServiceError> {
        Ok(self.repository.list(query).await?)
    }

    async fn get_patient(&self, id: Uuid) -> Result<Patient, ServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Patient not found".to_string()))
    }

    async fn update_patient(
        &self,
        id: Uuid,
        changes: UpdatePatientRequest,
        caller: &UserInfo,
    ) -> Result<Patient, ServiceError> {
        changes
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(e)))?;

        let patient = self.get_patient(id).await?;
        self.ensure_owner_or_admin(&patient, caller, "update")?;

        Ok(self.repository.update(id, changes).await?)
    }

    async fn delete_patient(&self, id: Uuid, caller: &UserInfo) -> Result<(), ServiceError> {
        let patient = self.get_patient(id).await?;
        self.ensure_owner_or_admin(&patient, caller, "delete")?;

        self.repository.delete(id).await?;
        info!("Deleted patient record {}", id);
        Ok(())
    }
}

/// Create a default patient service over the in-memory repository
pub fn create_default_patient_service() -> PatientService<PatientRepository> {
    PatientService::new(PatientRepository::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretrack_data::models::Gender;

    fn caller(user_id: Uuid, roles: &[&str]) -> UserInfo {
        UserInfo {
            user_id: user_id.to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn create_request() -> CreatePatientRequest {
        CreatePatientRequest {
            date_of_birth: "1990-02-20".parse().unwrap(),
            gender: Gender::Male,
            blood_type: None,
            allergies: vec![],
            conditions: vec![],
            emergency_contact: None,
            insurance_info: None,
            doctor_id: None,
        }
    }

    #[tokio::test]
    async fn test_owner_can_update() {
        let service = create_default_patient_service();
        let owner_id = Uuid::new_v4();
        let owner = caller(owner_id, &["user"]);

        let patient = service.create_patient(create_request(), &owner).await.unwrap();
        let updated = service
            .update_patient(
                patient.id,
                UpdatePatientRequest {
                    conditions: Some(vec!["diabetes".to_string()]),
                    ..Default::default()
                },
                &owner,
            )
            .await
            .unwrap();

        assert_eq!(updated.conditions, vec!["diabetes".to_string()]);
    }

    #[tokio::test]
    async fn test_non_owner_update_is_unauthorized_and_mutates_nothing() {
        let service = create_default_patient_service();
        let owner = caller(Uuid::new_v4(), &["user"]);
        let stranger = caller(Uuid::new_v4(), &["user"]);

        let patient = service.create_patient(create_request(), &owner).await.unwrap();
        let result = service
            .update_patient(
                patient.id,
                UpdatePatientRequest {
                    conditions: Some(vec!["diabetes".to_string()]),
                    ..Default::default()
                },
                &stranger,
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));

        // Record is untouched
        let fetched = service.get_patient(patient.id).await.unwrap();
        assert!(fetched.conditions.is_empty());
    }

    #[tokio::test]
    async fn test_admin_can_delete_any_patient() {
        let service = create_default_patient_service();
        let owner = caller(Uuid::new_v4(), &["user"]);
        let admin = caller(Uuid::new_v4(), &["admin"]);

        let patient = service.create_patient(create_request(), &owner).await.unwrap();
        service.delete_patient(patient.id, &admin).await.unwrap();

        let result = service.get_patient(patient.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_non_owner_delete_is_unauthorized() {
        let service = create_default_patient_service();
        let owner = caller(Uuid::new_v4(), &["user"]);
        let stranger = caller(Uuid::new_v4(), &["user"]);

        let patient = service.create_patient(create_request(), &owner).await.unwrap();
        let result = service.delete_patient(patient.id, &stranger).await;
        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));

        assert!(service.get_patient(patient.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_missing_patient_is_not_found() {
        let service = create_default_patient_service();
        let result = service.get_patient(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
