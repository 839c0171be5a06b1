use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The five supported vital-sign reading kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    BloodPressure,
    BloodSugar,
    HeartRate,
    Oxygen,
    Temperature,
}

impl ReadingKind {
    /// Wire name of the kind, as used in request bodies and filters
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingKind::BloodPressure => "blood_pressure",
            ReadingKind::BloodSugar => "blood_sugar",
            ReadingKind::HeartRate => "heart_rate",
            ReadingKind::Oxygen => "oxygen",
            ReadingKind::Temperature => "temperature",
        }
    }
}

/// Severity tier derived from measurement thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    Normal,
    Warning,
    Critical,
}

/// Numeric payload of a reading.
///
/// Blood pressure carries `systolic`/`diastolic`; the single-value kinds
/// carry `reading`. The unit tag is filled in by classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingValue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Storage model for a vital-sign measurement event.
///
/// `status` and `notes` are always derived by classification at creation
/// time; readings are immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Unique identifier for the reading
    pub id: Uuid,

    /// Patient this reading belongs to
    pub patient_id: Uuid,

    /// Reading kind
    #[serde(rename = "type")]
    pub kind: ReadingKind,

    pub value: ReadingValue,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Path of the normalized attachment image, if one was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub status: ReadingStatus,

    /// User id of whoever recorded the measurement
    pub recorded_by: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for recording a reading. Status and notes are never taken
/// from the client; they come out of classification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingRequest {
    pub patient_id: Uuid,

    #[serde(rename = "type")]
    pub kind: ReadingKind,

    /// Optional partial measurement; missing sub-values are simulated
    pub value: Option<ReadingValue>,
}
