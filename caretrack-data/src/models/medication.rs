use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a medication course
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    Active,
    Completed,
    Cancelled,
}

/// Prescribed dose amount
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dosage {
    pub value: f64,
    /// e.g. "mg", "ml", "tablet"
    pub unit: String,
}

/// One scheduled administration time with its taken flag.
///
/// Once `taken` is set the pair is monotonic: `taken_at` keeps the timestamp
/// of the first successful toggle and later toggles are no-ops.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoseSlot {
    /// Time of day, e.g. "08:00"
    pub time: String,

    #[serde(default)]
    pub taken: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
}

/// Storage model for a medication course
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    /// Unique identifier for the medication
    pub id: Uuid,

    /// Patient this medication belongs to
    pub patient_id: Uuid,

    pub name: String,

    pub dosage: Dosage,

    /// Free-form frequency description, e.g. "twice daily"
    pub frequency: String,

    /// Ordered daily dose schedule
    pub schedule: Vec<DoseSlot>,

    pub start_date: NaiveDate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    /// User id of the prescribing professional
    pub prescribed_by: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub status: MedicationStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a medication
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationRequest {
    pub patient_id: Uuid,

    #[validate(length(min = 1, message = "Medication name must not be empty"))]
    pub name: String,

    pub dosage: Dosage,

    #[validate(length(min = 1, message = "Frequency must not be empty"))]
    pub frequency: String,

    #[serde(default)]
    pub schedule: Vec<DoseSlot>,

    pub start_date: NaiveDate,

    pub end_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

/// Partial update for a medication; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicationRequest {
    #[validate(length(min = 1, message = "Medication name must not be empty"))]
    pub name: Option<String>,
    pub dosage: Option<Dosage>,
    pub frequency: Option<String>,
    pub schedule: Option<Vec<DoseSlot>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub status: Option<MedicationStatus>,
}
