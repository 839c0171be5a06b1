use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::models::{CreatePatientRequest, Patient, UpdatePatientRequest};
use crate::query::ListQuery;
use crate::store::Collection;

/// Repository trait for patient records
#[async_trait]
pub trait PatientRepositoryTrait {
    /// Create a patient record owned by the given user
    async fn create(
        &self,
        request: CreatePatientRequest,
        user_id: Uuid,
    ) -> Result<Patient, RepositoryError>;

    /// List patients matching a query, with the total count for the filter
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Patient>, usize), RepositoryError>;

    /// Fetch a patient by id
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Patient>, RepositoryError>;

    /// Apply a partial update to a patient
    async fn update(
        &self,
        id: Uuid,
        changes: UpdatePatientRequest,
    ) -> Result<Patient, RepositoryError>;

    /// Delete a patient. Readings and medications referencing the patient
    /// are left in place; there is no cascade.
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// Store-backed patient repository
#[derive(Debug, Clone, Default)]
pub struct PatientRepository {
    collection: Collection<Patient>,
}

impl PatientRepository {
    /// Create a new repository over an empty collection
    pub fn new() -> Self {
        Self {
            collection: Collection::new(),
        }
    }
}

#[async_trait]
impl PatientRepositoryTrait for PatientRepository {
    async fn create(
        &self,
        request: CreatePatientRequest,
        user_id: Uuid,
    ) -> Result<Patient, RepositoryError> {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            user_id,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            blood_type: request.blood_type,
            allergies: request.allergies,
            conditions: request.conditions,
            emergency_contact: request.emergency_contact,
            insurance_info: request.insurance_info,
            doctor_id: request.doctor_id,
            created_at: now,
            updated_at: now,
        };

        debug!("Storing patient record {}", patient.id);
        Ok(self.collection.put(patient.id, patient)?)
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Patient>, usize), RepositoryError> {
        Ok(self.collection.find(query)?)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.collection.get(&id)?)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdatePatientRequest,
    ) -> Result<Patient, RepositoryError> {
        let mut patient = self
            .collection
            .get(&id)?
            .ok_or_else(|| RepositoryError::NotFound("Patient", id.to_string()))?;

        if let Some(date_of_birth) = changes.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(gender) = changes.gender {
            patient.gender = gender;
        }
        if let Some(blood_type) = changes.blood_type {
            patient.blood_type = Some(blood_type);
        }
        if let Some(allergies) = changes.allergies {
            patient.allergies = allergies;
        }
        if let Some(conditions) = changes.conditions {
            patient.conditions = conditions;
        }
        if let Some(contact) = changes.emergency_contact {
            patient.emergency_contact = Some(contact);
        }
        if let Some(insurance) = changes.insurance_info {
            patient.insurance_info = Some(insurance);
        }
        if let Some(doctor_id) = changes.doctor_id {
            patient.doctor_id = Some(doctor_id);
        }
        patient.updated_at = Utc::now();

        Ok(self.collection.put(id, patient)?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.collection
            .remove(&id)?
            .ok_or_else(|| RepositoryError::NotFound("Patient", id.to_string()))?;
        debug!("Deleted patient record {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;

    fn create_request() -> CreatePatientRequest {
        CreatePatientRequest {
            date_of_birth: "1985-04-12".parse().unwrap(),
            gender: Gender::Female,
            blood_type: None,
            allergies: vec!["peanuts".to_string()],
            conditions: vec![],
            emergency_contact: None,
            insurance_info: None,
            doctor_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = PatientRepository::new();
        let owner = Uuid::new_v4();

        let patient = repo.create(create_request(), owner).await.unwrap();
        assert_eq!(patient.user_id, owner);

        let fetched = repo.get_by_id(patient.id).await.unwrap().unwrap();
        assert_eq!(fetched.allergies, vec!["peanuts".to_string()]);
    }

    #[tokio::test]
    async fn test_update_partial() {
        let repo = PatientRepository::new();
        let patient = repo.create(create_request(), Uuid::new_v4()).await.unwrap();

        let updated = repo
            .update(
                patient.id,
                UpdatePatientRequest {
                    conditions: Some(vec!["asthma".to_string()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.conditions, vec!["asthma".to_string()]);
        // Untouched fields survive
        assert_eq!(updated.allergies, vec!["peanuts".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = PatientRepository::new();
        let result = repo.delete(Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_, _))));
    }
}
