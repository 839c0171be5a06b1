//! HTTP request handlers.

pub mod analysis;
pub mod health;
pub mod medications;
pub mod patients;
pub mod readings;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::entities::ApiError;
use caretrack_data::query::{apply_select, ListQuery};

/// Maximum accepted request body, in bytes
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Parse raw query pairs into a structured list query
pub(crate) fn parse_list_query(pairs: &[(String, String)]) -> Result<ListQuery, ApiError> {
    ListQuery::from_pairs(pairs).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Serialize documents for the list envelope, applying any field projection
pub(crate) fn to_documents<T: Serialize>(
    items: &[T],
    query: &ListQuery,
) -> Result<Vec<Value>, ApiError> {
    let docs = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(match &query.select {
        Some(fields) => apply_select(docs, fields),
        None => docs,
    })
}

/// Read a request body that is either plain JSON or a multipart form with
/// a `data` part (JSON) and an optional `image` part (raw bytes).
pub(crate) async fn read_json_or_multipart(
    req: Request<Body>,
) -> Result<(Bytes, Option<Bytes>), ApiError> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if !is_multipart {
        let body = to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Unreadable request body: {}", e)))?;
        return Ok((body, None));
    }

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?;

    let mut data = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart field: {}", e)))?
    {
        let name = field.name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Unreadable multipart field: {}", e)))?;

        match name.as_deref() {
            Some("data") => data = Some(bytes),
            Some("image") => image = Some(bytes),
            _ => {}
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("Missing `data` form field".into()))?;
    Ok((data, image))
}
