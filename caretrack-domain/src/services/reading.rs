use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{caller_uuid, ServiceError};
use crate::analysis;
use crate::auth::UserInfo;
use crate::notify::Notifier;
use caretrack_data::models::{CreateReadingRequest, Reading, ReadingStatus};
use caretrack_data::query::ListQuery;
use caretrack_data::repository::{ReadingRepository, ReadingRepositoryTrait};

/// Trait for vital-sign reading operations
#[async_trait]
pub trait ReadingServiceTrait {
    /// Record a reading. Status, notes and the normalized value are derived
    /// by classification; a critical result raises an alert.
    async fn create_reading(
        &self,
        request: CreateReadingRequest,
        image: Option<String>,
        caller: &UserInfo,
    ) -> Result<Reading, ServiceError>;

    /// List readings matching a query
    async fn list_readings(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Reading>, usize), ServiceError>;

    /// Fetch a single reading
    async fn get_reading(&self, id: Uuid) -> Result<Reading, ServiceError>;

    /// All readings for one patient, newest first
    async fn readings_for_patient(&self, patient_id: Uuid)
        -> Result<Vec<Reading>, ServiceError>;
}

/// Reading service for domain logic
pub struct ReadingService<R: ReadingRepositoryTrait> {
    repository: R,
    notifier: Notifier,
}

impl<R: ReadingRepositoryTrait> ReadingService<R> {
    /// Create a new reading service
    pub fn new(repository: R, notifier: Notifier) -> Self {
        Self {
            repository,
            notifier,
        }
    }
}

#[async_trait]
impl<R: ReadingRepositoryTrait + Send + Sync> ReadingServiceTrait for ReadingService<R> {
    async fn create_reading(
        &self,
        request: CreateReadingRequest,
        image: Option<String>,
        caller: &UserInfo,
    ) -> Result<Reading, ServiceError> {
        let recorded_by = caller_uuid(caller)?;

        let classification = analysis::analyze_reading(request.kind, request.value.as_ref())
            .map_err(|e| ServiceError::Validation(e.to_string()))?;

        let now = Utc::now();
        let reading = Reading {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            kind: request.kind,
            value: classification.value,
            notes: Some(classification.notes),
            image,
            status: classification.status,
            recorded_by,
            created_at: now,
            updated_at: now,
        };

        let reading = self.repository.create(reading).await?;
        info!(
            "Recorded {} reading {} for patient {} ({:?})",
            reading.kind.as_str(),
            reading.id,
            reading.patient_id,
            reading.status
        );

        if reading.status == ReadingStatus::Critical {
            self.notifier
                .critical_alert(reading.patient_id, reading.kind, reading.status);
        }

        Ok(reading)
    }

    async fn list_readings(
        &self,
        query: &ListQuery,
    ) -> Result<(Vec<Reading>, usize), ServiceError> {
        Ok(self.repository.list(query).await?)
    }

    async fn get_reading(&self, id: Uuid) -> Result<Reading, ServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Reading not found".to_string()))
    }

    async fn readings_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Reading>, ServiceError> {
        Ok(self.repository.list_for_patient(patient_id).await?)
    }
}

/// Create a default reading service over the in-memory repository
pub fn create_default_reading_service(notifier: Notifier) -> ReadingService<ReadingRepository> {
    ReadingService::new(ReadingRepository::new(), notifier)
}
