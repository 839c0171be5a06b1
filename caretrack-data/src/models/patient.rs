use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Patient gender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// ABO/Rh blood type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

/// Emergency contact details for a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: Option<String>,
    pub phone: Option<String>,
}

/// Insurance details for a patient
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceInfo {
    pub provider: String,
    pub policy_number: Option<String>,
}

/// Storage model for a patient record
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Unique identifier for the patient record
    pub id: Uuid,

    /// The user account that owns this patient record
    pub user_id: Uuid,

    pub date_of_birth: NaiveDate,

    pub gender: Gender,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<BloodType>,

    /// Known allergies, free-form strings
    pub allergies: Vec<String>,

    /// Known chronic conditions, free-form strings
    pub conditions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_info: Option<InsuranceInfo>,

    /// Assigned doctor (user id), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a patient record
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub date_of_birth: NaiveDate,

    pub gender: Gender,

    pub blood_type: Option<BloodType>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub conditions: Vec<String>,

    pub emergency_contact: Option<EmergencyContact>,

    pub insurance_info: Option<InsuranceInfo>,

    pub doctor_id: Option<Uuid>,
}

/// Partial update for a patient record; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub blood_type: Option<BloodType>,
    pub allergies: Option<Vec<String>>,
    pub conditions: Option<Vec<String>>,
    pub emergency_contact: Option<EmergencyContact>,
    pub insurance_info: Option<InsuranceInfo>,
    pub doctor_id: Option<Uuid>,
}
