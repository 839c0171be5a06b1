use thiserror::Error;

use crate::query::QueryError;
use crate::store::StoreError;

/// Error type for repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    /// Malformed list query (client input)
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}
