//! API route and handler wiring.

pub mod handlers;
pub mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use caretrack_domain::notify::Notifier;
use caretrack_domain::services::{
    create_default_medication_service, create_default_patient_service,
    create_default_reading_service, MedicationServiceTrait, PatientServiceTrait,
    ReadingServiceTrait,
};

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientServiceTrait + Send + Sync>,
    pub medications: Arc<dyn MedicationServiceTrait + Send + Sync>,
    pub readings: Arc<dyn ReadingServiceTrait + Send + Sync>,
    pub uploads_dir: PathBuf,
}

impl AppState {
    /// Build the state with the default in-memory services
    pub fn new(uploads_dir: PathBuf) -> Self {
        let notifier = Notifier::new();

        Self {
            patients: Arc::new(create_default_patient_service()),
            medications: Arc::new(create_default_medication_service()),
            readings: Arc::new(create_default_reading_service(notifier)),
            uploads_dir,
        }
    }
}
