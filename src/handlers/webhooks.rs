//! Webhook ingestion handler shared by all six event routes.
//!
//! # Endpoints
//!
//! - `POST /webhook/opens`
//! - `POST /webhook/clicks`
//! - `POST /webhook/replies`
//! - `POST /webhook/bounces`
//! - `POST /webhook/unsubscribes`
//! - `POST /webhook/sends`
//!
//! Requests only reach this handler after [`ApiKeyAuth`](crate::middleware::ApiKeyAuth)
//! accepted them. The body is read as raw bytes and parsed here, so a
//! missing `Content-Type` header is accepted while an empty or non-JSON
//! body yields 400 on every route alike.

use axum::Json;
use axum::body::Bytes;
use axum::http::HeaderMap;
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::middleware::{AuthorizedKey, REQUEST_ID_HEADER};
use crate::models::{AckResponse, EventRecord, EventType};
use crate::services::log_event;

/// Accept one webhook delivery of the given type.
///
/// # Errors
///
/// Returns `AppError::MalformedBody` if the body is not a JSON document.
#[instrument(skip_all, fields(event_type = %event_type))]
pub async fn receive_event(
    event_type: EventType,
    key: AuthorizedKey,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<AckResponse>> {
    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        metrics::record_malformed_body(event_type);
        AppError::from(e)
    })?;

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let record = EventRecord::new(event_type, key.as_str(), payload).with_request_id(request_id);
    log_event(&record);

    Ok(Json(AckResponse::success()))
}
