//! HTTP middleware for webhook authentication and request correlation.
//!
//! # Architecture
//!
//! ```text
//! Request → Request ID → Trace → CORS → Body Limit → [Auth] → Handler
//!               ↓                                       ↓
//!        X-Request-Id header                     401 Unauthorized
//! ```
//!
//! Auth applies to `/webhook/*` only. Request IDs use `tower-http`'s
//! `SetRequestIdLayer`/`PropagateRequestIdLayer`; see [`request_id_layers`].

pub mod auth;

pub use auth::{API_KEY_HEADER, ApiKeyAuth, AuthorizedKey, authorize};

use axum::http::HeaderName;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Layers that assign a UUID `x-request-id` to requests lacking one and
/// copy it onto the response.
///
/// Returned as a pair: apply `set` outermost so the ID exists before the
/// trace span opens.
pub fn request_id_layers() -> (SetRequestIdLayer<MakeRequestUuid>, PropagateRequestIdLayer) {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    (
        SetRequestIdLayer::new(header.clone(), MakeRequestUuid),
        PropagateRequestIdLayer::new(header),
    )
}
