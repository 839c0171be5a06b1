// Storage models for the CareTrack collections.
//
// All models serialize with camelCase field names; that is the wire contract
// and also the name space the list-query filters operate on.

mod medication;
mod patient;
mod reading;

pub use medication::{
    CreateMedicationRequest, Dosage, DoseSlot, Medication, MedicationStatus,
    UpdateMedicationRequest,
};
pub use patient::{
    BloodType, CreatePatientRequest, EmergencyContact, Gender, InsuranceInfo, Patient,
    UpdatePatientRequest,
};
pub use reading::{CreateReadingRequest, Reading, ReadingKind, ReadingStatus, ReadingValue};
