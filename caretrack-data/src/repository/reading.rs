use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::errors::RepositoryError;
use crate::models::Reading;
use crate::query::ListQuery;
use crate::store::Collection;

/// Repository trait for vital-sign readings.
///
/// Readings are classified before they reach the repository and are
/// immutable once stored, so there is no update or delete operation.
#[async_trait]
pub trait ReadingRepositoryTrait {
    /// Store an already-classified reading
    async fn create(&self, reading: Reading) -> Result<Reading, RepositoryError>;

    /// List readings matching a query, with the total count for the filter
    async fn list(&self, query: &ListQuery) -> Result<(Vec<Reading>, usize), RepositoryError>;

    /// Fetch a reading by id
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Reading>, RepositoryError>;

    /// All readings for one patient, newest first
    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Reading>, RepositoryError>;
}

/// Store-backed reading repository
#[derive(Debug, Clone, Default)]
pub struct ReadingRepository {
    collection: Collection<Reading>,
}

impl ReadingRepository {
    /// Create a new repository over an empty collection
    pub fn new() -> Self {
        Self {
            collection: Collection::new(),
        }
    }
}

#[async_trait]
impl ReadingRepositoryTrait for ReadingRepository {
    async fn create(&self, reading: Reading) -> Result<Reading, RepositoryError> {
        debug!("Storing {} reading {}", reading.kind.as_str(), reading.id);
        Ok(self.collection.put(reading.id, reading)?)
    }

    async fn list(&self, query: &ListQuery) -> Result<(Vec<Reading>, usize), RepositoryError> {
        Ok(self.collection.find(query)?)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Reading>, RepositoryError> {
        Ok(self.collection.get(&id)?)
    }

    async fn list_for_patient(&self, patient_id: Uuid) -> Result<Vec<Reading>, RepositoryError> {
        let pairs = vec![
            ("patientId".to_string(), patient_id.to_string()),
            ("limit".to_string(), usize::MAX.to_string()),
        ];
        let query = ListQuery::from_pairs(&pairs)?;
        let (readings, _) = self.collection.find(&query)?;
        Ok(readings)
    }
}
