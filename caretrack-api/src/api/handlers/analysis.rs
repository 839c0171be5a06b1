use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::handlers::read_json_or_multipart;
use crate::api::AppState;
use crate::entities::{ApiError, Envelope};
use caretrack_data::models::{ReadingKind, ReadingValue};
use caretrack_domain::analysis;
use caretrack_domain::imaging;

/// Body for ad-hoc analysis of a measurement that is not stored
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Kind of vital sign being analyzed
    #[serde(rename = "type")]
    pub kind: ReadingKind,

    /// Measured values. Absent sub-values are simulated.
    pub values: Option<ReadingValue>,
}

/// Classify a measurement without recording it. Accepts plain JSON, or a
/// multipart form with a JSON `data` part and an optional `image` part.
/// An uploaded image is normalized and stored; classification works off
/// the numeric values alone.
#[utoipa::path(
    post,
    path = "/api/ai/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Classification for the measurement", body = crate::entities::AnalysisEnvelope),
        (status = 400, description = "Unknown reading type or unusable values"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "analysis"
)]
#[instrument(skip(state, req))]
pub async fn analyze(
    State(state): State<AppState>,
    req: Request<Body>,
) -> Result<impl IntoResponse, ApiError> {
    let (data, image_bytes) = read_json_or_multipart(req).await?;

    let request: AnalyzeRequest = serde_json::from_slice(&data)
        .map_err(|e| ApiError::BadRequest(format!("Invalid analysis payload: {}", e)))?;

    if let Some(bytes) = image_bytes {
        imaging::process_medical_image(&bytes, &state.uploads_dir)
            .map_err(|e| ApiError::BadRequest(format!("Unprocessable image: {}", e)))?;
    }

    let classification = analysis::analyze_reading(request.kind, request.values.as_ref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    Ok((StatusCode::OK, Json(Envelope::of(classification))))
}

/// Reference ranges for every supported reading kind
#[utoipa::path(
    get,
    path = "/api/ai/ranges",
    responses(
        (status = 200, description = "Reference range table"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "analysis"
)]
#[instrument]
pub async fn ranges() -> impl IntoResponse {
    (StatusCode::OK, Json(Envelope::of(analysis::reference_ranges())))
}
