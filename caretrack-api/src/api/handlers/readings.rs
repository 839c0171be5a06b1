use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::handlers::{parse_list_query, read_json_or_multipart, to_documents};
use crate::entities::{ApiError, Envelope};
use caretrack_data::models::CreateReadingRequest;
use caretrack_data::query::Pagination;
use caretrack_domain::auth::UserInfo;
use caretrack_domain::imaging;

/// List vital-sign readings with filtering, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/readings",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys, `-` prefix for descending"),
        ("page" = Option<usize>, Query, description = "Page number, 1-based"),
        ("limit" = Option<usize>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Readings matching the query", body = crate::entities::ReadingListEnvelope),
        (status = 400, description = "Malformed query parameter"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
#[instrument(skip(state))]
pub async fn list_readings(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let query = parse_list_query(&params)?;
    let (readings, total) = state.readings.list_readings(&query).await?;

    let pagination = Pagination::compute(query.page, query.limit, total);
    let docs = to_documents(&readings, &query)?;

    Ok((StatusCode::OK, Json(Envelope::list(docs, pagination))))
}

/// Record a vital-sign reading. Accepts plain JSON, or a multipart form
/// with a JSON `data` part and an optional `image` attachment which is
/// resized and stored on disk. The reading is classified on the way in.
#[utoipa::path(
    post,
    path = "/api/readings",
    request_body = CreateReadingRequest,
    responses(
        (status = 201, description = "Reading recorded and classified", body = crate::entities::ReadingEnvelope),
        (status = 400, description = "Invalid request or unreadable image"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
#[instrument(skip(state, user, req))]
pub async fn create_reading(
    State(state): State<AppState>,
    Extension(user): Extension<UserInfo>,
    req: Request<Body>,
) -> Result<impl IntoResponse, ApiError> {
    let (data, image_bytes) = read_json_or_multipart(req).await?;

    let request: CreateReadingRequest = serde_json::from_slice(&data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid reading payload: {}", e)))?;

    let image = match image_bytes {
        Some(bytes) => {
            let path = imaging::process_medical_image(&bytes, &state.uploads_dir)
                .map_err(|e| ApiError::BadRequest(format!("Unprocessable image: {}", e)))?;
            Some(path.to_string_lossy().into_owned())
        }
        None => None,
    };

    let reading = state.readings.create_reading(request, image, &user).await?;
    info!(
        "Reading recorded with ID: {} (status: {:?})",
        reading.id, reading.status
    );

    Ok((StatusCode::CREATED, Json(Envelope::of(reading))))
}

/// Fetch a single reading
#[utoipa::path(
    get,
    path = "/api/readings/{id}",
    params(
        ("id" = Uuid, Path, description = "Reading ID")
    ),
    responses(
        (status = 200, description = "Reading found", body = crate::entities::ReadingEnvelope),
        (status = 404, description = "Reading not found"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
#[instrument(skip(state))]
pub async fn get_reading(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reading = state.readings.get_reading(id).await?;
    Ok((StatusCode::OK, Json(Envelope::of(reading))))
}

/// List every reading recorded for one patient, newest first
#[utoipa::path(
    get,
    path = "/api/readings/patient/{patient_id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient record ID")
    ),
    responses(
        (status = 200, description = "Readings for the patient", body = crate::entities::ReadingListEnvelope),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "readings"
)]
#[instrument(skip(state))]
pub async fn patient_readings(
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let readings = state.readings.readings_for_patient(patient_id).await?;

    let count = readings.len();
    Ok((
        StatusCode::OK,
        Json(Envelope {
            success: true,
            count: Some(count),
            data: Some(readings),
            pagination: None,
            message: None,
        }),
    ))
}
