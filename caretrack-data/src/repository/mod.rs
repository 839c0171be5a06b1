// Repository module structure
pub mod errors;
mod medication;
mod patient;
mod reading;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use medication::{MedicationRepository, MedicationRepositoryTrait};
pub use patient::{PatientRepository, PatientRepositoryTrait};
pub use reading::{ReadingRepository, ReadingRepositoryTrait};
