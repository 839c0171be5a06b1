use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{caller_uuid, validation_message, ServiceError};
use crate::auth::UserInfo;
use caretrack_data::models::{CreateMedicationRequest, Medication, UpdateMedicationRequest};
use caretrack_data::query::ListQuery;
use caretrack_data::repository::{MedicationRepository, MedicationRepositoryTrait};

/// Trait for medication operations
#[async_trait]
pub trait MedicationServiceTrait {
    /// Create a medication prescribed by the caller
    async fn create_medication(
        &self,
        request: CreateMedicationRequest,
        caller: &UserInfo,
    ) -> Result<Medication, ServiceError>;

    /// List medications matching a query
    async fn list_medications(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Medication>, usize), ServiceError>;

    /// Fetch a single medication
    async fn get_medication(&self, id: Uuid) -> Result<Medication, ServiceError>;

    /// Update a medication
    async fn update_medication(
        &self,
        id: Uuid,
        changes: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError>;

    /// Delete a medication
    async fn delete_medication(&self, id: Uuid) -> Result<(), ServiceError>;

    /// All medications for one patient, newest first
    async fn medications_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Medication>, ServiceError>;

    /// Mark one scheduled dose as taken. Idempotent per dose slot.
    async fn mark_dose_taken(
        &self,
        id: Uuid,
        dose_index: usize,
    ) -> Result<Medication, ServiceError>;
}

/// Medication service for domain logic
pub struct MedicationService<R: MedicationRepositoryTrait> {
    repository: R,
}

impl<R: MedicationRepositoryTrait> MedicationService<R> {
    /// Create a new medication service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: MedicationRepositoryTrait + Send + Sync> MedicationServiceTrait for MedicationService<R> {
    async fn create_medication(
        &self,
        request: CreateMedicationRequest,
        caller: &UserInfo,
    ) -> Result<Medication, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(e)))?;

        let prescriber = caller_uuid(caller)?;
        let medication = self.repository.create(request, prescriber).await?;
        info!(
            "Created medication {} for patient {}",
            medication.id, medication.patient_id
        );
        Ok(medication)
    }

    async fn list_medications(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Medication>, usize), ServiceError> {
        Ok(self.repository.list(query).await?)
    }

    async fn get_medication(&self, id: Uuid) -> Result<Medication, ServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Medication not found".to_string()))
    }

    async fn update_medication(
        &self,
        id: Uuid,
        changes: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        changes
            .validate()
            .map_err(|e| ServiceError::Validation(validation_message(e)))?;

        // Surface a NotFound with the API's wording before updating
        self.get_medication(id).await?;
        Ok(self.repository.update(id, changes).await?)
    }

    async fn delete_medication(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_medication(id).await?;
        self.repository.delete(id).await?;
        info!("Deleted medication {}", id);
        Ok(())
    }

    async fn medications_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Medication>, ServiceError> {
        Ok(self.repository.list_for_patient(patient_id).await?)
    }

    async fn mark_dose_taken(
        &self,
        id: Uuid,
        dose_index: usize,
    ) -> Result<Medication, ServiceError> {
        self.get_medication(id).await?;
        Ok(self.repository.mark_dose_taken(id, dose_index).await?)
    }
}

/// Create a default medication service over the in-memory repository
pub fn create_default_medication_service() -> MedicationService<MedicationRepository> {
    MedicationService::new(MedicationRepository::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretrack_data::models::{Dosage, DoseSlot};

    fn caller() -> UserInfo {
        UserInfo {
            user_id: Uuid::new_v4().to_string(),
            roles: vec!["healthcare_professional".to_string()],
        }
    }

    fn create_request(patient_id: Uuid) -> CreateMedicationRequest {
        CreateMedicationRequest {
            patient_id,
            name: "Lisinopril".to_string(),
            dosage: Dosage {
                value: 10.0,
                unit: "mg".to_string(),
            },
            frequency: "once daily".to_string(),
            schedule: vec![DoseSlot {
                time: "09:00".to_string(),
                taken: false,
                taken_at: None,
            }],
            start_date: "2023-03-01".parse().unwrap(),
            end_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_records_prescriber() {
        let service = create_default_medication_service();
        let prescriber = caller();

        let medication = service
            .create_medication(create_request(Uuid::new_v4()), &prescriber)
            .await
            .unwrap();
        assert_eq!(
            medication.prescribed_by.to_string(),
            prescriber.user_id
        );
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = create_default_medication_service();
        let mut request = create_request(Uuid::new_v4());
        request.name = String::new();

        let result = service.create_medication(request, &caller()).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_mark_dose_taken_survives_service_boundary() {
        let service = create_default_medication_service();
        let medication = service
            .create_medication(create_request(Uuid::new_v4()), &caller())
            .await
            .unwrap();

        let updated = service.mark_dose_taken(medication.id, 0).await.unwrap();
        assert!(updated.schedule[0].taken);
        assert!(updated.schedule[0].taken_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_medication_is_not_found() {
        let service = create_default_medication_service();
        let result = service
            .update_medication(Uuid::new_v4(), UpdateMedicationRequest::default())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
