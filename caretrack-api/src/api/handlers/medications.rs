use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::handlers::{parse_list_query, to_documents};
use crate::entities::{ApiError, Envelope};
use caretrack_data::models::{CreateMedicationRequest, UpdateMedicationRequest};
use caretrack_data::query::Pagination;
use caretrack_domain::auth::{authorize::ensure_any_role, UserInfo};

/// Roles allowed to create, change or remove prescriptions
const PRESCRIBER_ROLES: &[&str] = &["healthcare_professional", "admin"];

/// Body for marking one scheduled dose as taken
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkTakenRequest {
    /// Index into the medication's dose schedule
    pub dose_index: usize,
}

/// List medications with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/medications",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys, `-` prefix for descending"),
        ("page" = Option<usize>, Query, description = "Page number, 1-based"),
        ("limit" = Option<usize>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Medications matching the query", body = crate::entities::MedicationListEnvelope),
        (status = 400, description = "Malformed query parameter"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn list_medications(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_list_query(&params)?;
    let (medications, total) = state.medications.list_medications(&query).await?;

    let pagination = Pagination::compute(query.page, query.limit, total);
    let docs = to_documents(&medications, &query)?;

    Ok((StatusCode::OK, Json(Envelope::list(docs, pagination))))
}

/// Prescribe a medication. Restricted to healthcare professionals.
#[utoipa::path(
    post,
    path = "/api/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication created", body = crate::entities::MedicationEnvelope),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Caller lacks a prescriber role"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, request, user))]
pub async fn create_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreateMedicationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_any_role(&user, PRESCRIBER_ROLES)?;

    let medication = state.medications.create_medication(request, &user).await?;
    info!("Medication created with ID: {}", medication.id);

    Ok((StatusCode::CREATED, Json(Envelope::of(medication))))
}

/// Fetch a single medication
#[utoipa::path(
    get,
    path = "/api/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    responses(
        (status = 200, description = "Medication found", body = crate::entities::MedicationEnvelope),
        (status = 404, description = "Medication not found"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn get_medication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let medication = state.medications.get_medication(id).await?;
    Ok((StatusCode::OK, Json(Envelope::of(medication))))
}

/// Update a medication. Restricted to healthcare professionals.
#[utoipa::path(
    put,
    path = "/api/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    request_body = UpdateMedicationRequest,
    responses(
        (status = 200, description = "Medication updated", body = crate::entities::MedicationEnvelope),
        (status = 401, description = "Caller lacks a prescriber role"),
        (status = 404, description = "Medication not found"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, request, user))]
pub async fn update_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMedicationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_any_role(&user, PRESCRIBER_ROLES)?;

    let medication = state.medications.update_medication(id, request).await?;
    Ok((StatusCode::OK, Json(Envelope::of(medication))))
}

/// Remove a medication. Restricted to healthcare professionals.
#[utoipa::path(
    delete,
    path = "/api/medications/{id}",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    responses(
        (status = 200, description = "Medication deleted"),
        (status = 401, description = "Caller lacks a prescriber role"),
        (status = 404, description = "Medication not found"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state, user))]
pub async fn delete_medication(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    ensure_any_role(&user, PRESCRIBER_ROLES)?;

    state.medications.delete_medication(id).await?;
    info!("Medication deleted: {}", id);

    Ok((StatusCode::OK, Json(Envelope::empty())))
}

/// Mark one scheduled dose as taken. Marking an already-taken dose keeps
/// the original timestamp.
#[utoipa::path(
    put,
    path = "/api/medications/{id}/taken",
    params(
        ("id" = Uuid, Path, description = "Medication ID")
    ),
    request_body = MarkTakenRequest,
    responses(
        (status = 200, description = "Dose marked as taken", body = crate::entities::MedicationEnvelope),
        (status = 400, description = "Dose index out of range"),
        (status = 404, description = "Medication not found"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn mark_dose_taken(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MarkTakenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let medication = state
        .medications
        .mark_dose_taken(id, request.dose_index)
        .await?;

    Ok((StatusCode::OK, Json(Envelope::of(medication))))
}

/// List every medication prescribed to one patient, newest first
#[utoipa::path(
    get,
    path = "/api/medications/patient/{patient_id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient record ID")
    ),
    responses(
        (status = 200, description = "Medications for the patient", body = crate::entities::MedicationListEnvelope),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "medications"
)]
#[instrument(skip(state))]
pub async fn patient_medications(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let medications = state.medications.medications_for_patient(patient_id).await?;

    let count = medications.len();
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            count: Some(count),
            data: Some(medications),
            pagination: None,
            message: None,
        }),
    ))
}
