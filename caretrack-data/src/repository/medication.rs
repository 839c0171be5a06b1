use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::models::{
    CreateMedicationRequest, Medication, MedicationStatus, UpdateMedicationRequest,
};
use crate::query::ListQuery;
use crate::store::Collection;

/// Repository trait for medications
#[async_trait]
pub trait MedicationRepositoryTrait {
    /// Create a medication prescribed by the given user
    async fn create(
        &self,
        request: CreateMedicationRequest,
        prescribed_by: Uuid,
    ) -> Result<Medication, RepositoryError>;

    /// List medications matching a query, with the total count for the filter
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Medication>, usize), RepositoryError>;

    /// Fetch a medication by id
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Medication>, RepositoryError>;

    /// Apply a partial update to a medication
    async fn update(
        &self,
        id: Uuid,
        changes: UpdateMedicationRequest,
    ) -> Result<Medication, RepositoryError>;

    /// Delete a medication
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;

    /// All medications for one patient, newest first
    async fn list_for_patient(&self, patient_id: Uuid)
        -> Result<Vec<Medication>, RepositoryError>;

    /// Mark the dose at `dose_index` as taken. Idempotent: a slot already
    /// taken keeps its original `taken_at`.
    async fn mark_dose_taken(
        &self,
        id: Uuid,
        dose_index: usize,
    ) -> Result<Medication, RepositoryError>;
}

/// Store-backed medication repository
#[derive(Debug, Clone, Default)]
pub struct MedicationRepository {
    collection: Collection<Medication>,
}

impl MedicationRepository {
    /// Create a new repository over an empty collection
    pub fn new() -> Self {
        Self {
            collection: Collection::new(),
        }
    }
}

#[async_trait]
impl MedicationRepositoryTrait for MedicationRepository {
    async fn create(
        &self,
        request: CreateMedicationRequest,
        prescribed_by: Uuid,
    ) -> Result<Medication, RepositoryError> {
        let now = Utc::now();
        let medication = Medication {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            name: request.name,
            dosage: request.dosage,
            frequency: request.frequency,
            schedule: request.schedule,
            start_date: request.start_date,
            end_date: request.end_date,
            prescribed_by,
            notes: request.notes,
            status: MedicationStatus::Active,
            created_at: now,
            updated_at: now,
        };

        debug!("Storing medication {}", medication.id);
        Ok(self.collection.put(medication.id, medication)?)
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Medication>, usize), RepositoryError> {
        Ok(self.collection.find(query)?)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Medication>, RepositoryError> {
        Ok(self.collection.get(&id)?)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UpdateMedicationRequest,
    ) -> Result<Medication, RepositoryError> {
        let mut medication = self
            .collection
            .get(&id)?
            .ok_or_else(|| RepositoryError::NotFound("Medication", id.to_string()))?;

        if let Some(name) = changes.name {
            medication.name = name;
        }
        if let Some(dosage) = changes.dosage {
            medication.dosage = dosage;
        }
        if let Some(frequency) = changes.frequency {
            medication.frequency = frequency;
        }
        if let Some(schedule) = changes.schedule {
            medication.schedule = schedule;
        }
        if let Some(start_date) = changes.start_date {
            medication.start_date = start_date;
        }
        if let Some(end_date) = changes.end_date {
            medication.end_date = Some(end_date);
        }
        if let Some(notes) = changes.notes {
            medication.notes = Some(notes);
        }
        if let Some(status) = changes.status {
            medication.status = status;
        }
        medication.updated_at = Utc::now();

        Ok(self.collection.put(id, medication)?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        self.collection
            .remove(&id)?
            .ok_or_else(|| RepositoryError::NotFound("Medication", id.to_string()))?;
        debug!("Deleted medication {}", id);
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Medication>, RepositoryError> {
        let pairs = vec![
            ("patientId".to_string(), patient_id.to_string()),
            ("limit".to_string(), usize::MAX.to_string()),
        ];
        let query = ListQuery::from_pairs(&pairs)?;
        let (medications, _) = self.collection.find(&query)?;
        Ok(medications)
    }

    async fn mark_dose_taken(
        &self,
        id: Uuid,
        dose_index: usize,
    ) -> Result<Medication, RepositoryError> {
        let mut medication = self
            .collection
            .get(&id)?
            .ok_or_else(|| RepositoryError::NotFound("Medication", id.to_string()))?;

        let slot = medication.schedule.get_mut(dose_index).ok_or_else(|| {
            RepositoryError::Validation(format!(
                "Dose index {} out of range for schedule of {} entries",
                dose_index,
                id
            ))
        })?;

        // Monotonic: the first toggle wins, a repeat call is a no-op
        if !slot.taken {
            slot.taken = true;
            slot.taken_at = Some(Utc::now());
            medication.updated_at = Utc::now();
        }

        Ok(self.collection.put(id, medication)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dosage, DoseSlot};

    fn create_request(patient_id: Uuid) -> CreateMedicationRequest {
        CreateMedicationRequest {
            patient_id,
            name: "Metformin".to_string(),
            dosage: Dosage {
                value: 500.0,
                unit: "mg".to_string(),
            },
            frequency: "twice daily".to_string(),
            schedule: vec![
                DoseSlot {
                    time: "08:00".to_string(),
                    taken: false,
                    taken_at: None,
                },
                DoseSlot {
                    time: "20:00".to_string(),
                    taken: false,
                    taken_at: None,
                },
            ],
            start_date: "2023-06-01".parse().unwrap(),
            end_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let repo = MedicationRepository::new();
        let medication = repo
            .create(create_request(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(medication.status, MedicationStatus::Active);
    }

    #[tokio::test]
    async fn test_mark_dose_taken_is_idempotent() {
        let repo = MedicationRepository::new();
        let medication = repo
            .create(create_request(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap();

        let first = repo.mark_dose_taken(medication.id, 0).await.unwrap();
        let first_taken_at = first.schedule[0].taken_at.unwrap();
        assert!(first.schedule[0].taken);
        assert!(!first.schedule[1].taken);

        // Second toggle keeps the first timestamp
        let second = repo.mark_dose_taken(medication.id, 0).await.unwrap();
        assert!(second.schedule[0].taken);
        assert_eq!(second.schedule[0].taken_at.unwrap(), first_taken_at);
    }

    #[tokio::test]
    async fn test_mark_dose_taken_out_of_range() {
        let repo = MedicationRepository::new();
        let medication = repo
            .create(create_request(Uuid::new_v4()), Uuid::new_v4())
            .await
            .unwrap();

        let result = repo.mark_dose_taken(medication.id, 5).await;
        assert!(matches!(result, Err(RepositoryError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_for_patient_filters_by_patient() {
        let repo = MedicationRepository::new();
        let patient_a = Uuid::new_v4();
        let patient_b = Uuid::new_v4();
        let prescriber = Uuid::new_v4();

        repo.create(create_request(patient_a), prescriber).await.unwrap();
        repo.create(create_request(patient_a), prescriber).await.unwrap();
        repo.create(create_request(patient_b), prescriber).await.unwrap();

        let medications = repo.list_for_patient(patient_a).await.unwrap();
        assert_eq!(medications.len(), 2);
        assert!(medications.iter().all(|m| m.patient_id == patient_a));
    }
}
