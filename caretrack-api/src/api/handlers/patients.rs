use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::handlers::{parse_list_query, to_documents};
use crate::entities::{ApiError, Envelope};
use caretrack_data::models::{CreatePatientRequest, UpdatePatientRequest};
use caretrack_data::query::Pagination;
use caretrack_domain::auth::UserInfo;

/// List patient records with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/patients",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys, `-` prefix for descending"),
        ("page" = Option<usize>, Query, description = "Page number, 1-based"),
        ("limit" = Option<usize>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Patients matching the query", body = crate::entities::PatientListEnvelope),
        (status = 400, description = "Malformed query parameter"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_list_query(&params)?;
    let (patients, total) = state.patients.list_patients(&query).await?;

    let pagination = Pagination::compute(query.page, query.limit, total);
    let docs = to_documents(&patients, &query)?;

    Ok((StatusCode::OK, Json(Envelope::list(docs, pagination))))
}

/// Create a patient record owned by the caller
#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient created", body = crate::entities::PatientEnvelope),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(state, request, user))]
pub async fn create_patient(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state.patients.create_patient(request, &user).await?;
    info!("Patient record created with ID: {}", patient.id);

    Ok((StatusCode::CREATED, Json(Envelope::of(patient))))
}

/// Fetch a single patient record
#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient record ID")
    ),
    responses(
        (status = 200, description = "Patient found", body = crate::entities::PatientEnvelope),
        (status = 404, description = "Patient not found"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(state))]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state.patients.get_patient(id).await?;
    Ok((StatusCode::OK, Json(Envelope::of(patient))))
}

/// Update a patient record. Only the owner or an admin may update.
#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient record ID")
    ),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = crate::entities::PatientEnvelope),
        (status = 401, description = "Caller does not own this record"),
        (status = 404, description = "Patient not found"),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(state, request, user))]
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patient = state.patients.update_patient(id, request, &user).await?;
    Ok((StatusCode::OK, Json(Envelope::of(patient))))
}

/// Delete a patient record. Only the owner or an admin may delete.
/// Medications and readings that reference the record are left in place.
#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(
        ("id" = Uuid, Path, description = "Patient record ID")
    ),
    responses(
        (status = 200, description = "Patient deleted"),
        (status = 401, description = "Caller does not own this record"),
        (status = 404, description = "Patient not found"),
    ),
    security(("bearer" = [])),
    tag = "patients"
)]
#[instrument(skip(state, user))]
pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.patients.delete_patient(id, &user).await?;
    info!("Patient record deleted: {}", id);

    Ok((StatusCode::OK, Json(Envelope::empty())))
}
