//! Public API entities shared by the handlers.

pub mod common;

pub use common::{ApiError, Envelope};
pub use common::{
    AnalysisEnvelope, MedicationEnvelope, MedicationListEnvelope, PatientEnvelope,
    PatientListEnvelope, ReadingEnvelope, ReadingListEnvelope,
};
