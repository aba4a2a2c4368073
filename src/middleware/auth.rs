//! API key authentication middleware for webhook routes.
//!
//! # Security Features
//!
//! - **Constant-time comparison**: Key membership never short-circuits on a
//!   partial match
//! - **Redacted logging**: Rejected keys are logged as their first four
//!   characters only
//! - **Per-request check**: No sessions or cached results; every delivery is
//!   authenticated on its own
//!
//! # Usage
//!
//! GMass sends the shared secret in the `X-apikey` header:
//!
//! ```bash
//! curl -X POST -H "X-apikey: your-secret-key" \
//!      -H "Content-Type: application/json" \
//!      -d '{"email":"a@b.com"}' \
//!      http://localhost:5000/webhook/opens
//! ```
//!
//! # Scope
//!
//! The layer is attached with `route_layer` to the webhook routes only, so
//! `/` and `/health` are never authenticated and unknown paths still return
//! 404 rather than 401.

use std::fmt;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response};
use axum::response::IntoResponse;
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::keys::{KeyStore, key_prefix};
use crate::metrics::{self, AuthFailure};

/// Header name for the API key (matched case-insensitively).
pub const API_KEY_HEADER: &str = "x-apikey";

/// An API key that passed authentication.
///
/// Inserted into request extensions by [`ApiKeyAuthService`] so handlers can
/// derive the loggable suffix without re-reading headers.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedKey(String);

impl AuthorizedKey {
    /// The full key, for in-process use only. Never log this.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthorizedKey").field(&"<redacted>").finish()
    }
}

/// Check the `X-apikey` header against the key set.
///
/// # Errors
///
/// - `AppError::MissingKey` if the header is absent or empty
/// - `AppError::InvalidKey` if the value is not an authorized key
pub fn authorize(keys: &KeyStore, headers: &HeaderMap) -> AppResult<AuthorizedKey> {
    let provided = match headers.get(API_KEY_HEADER) {
        Some(value) if !value.is_empty() => value,
        _ => {
            warn!("No API key provided in request");
            metrics::record_auth_failure(AuthFailure::MissingKey);
            return Err(AppError::MissingKey);
        }
    };

    if !keys.contains(provided.as_bytes()) {
        let attempted = String::from_utf8_lossy(provided.as_bytes());
        warn!(
            key_prefix = key_prefix(&attempted),
            "Invalid API key attempted"
        );
        metrics::record_auth_failure(AuthFailure::InvalidKey);
        return Err(AppError::InvalidKey);
    }

    // Stored keys are UTF-8, so a byte-equal match always converts
    let key = String::from_utf8_lossy(provided.as_bytes()).into_owned();
    Ok(AuthorizedKey(key))
}

/// API key authentication layer.
#[derive(Clone, Debug)]
pub struct ApiKeyAuth {
    keys: KeyStore,
}

impl ApiKeyAuth {
    /// Create a new auth layer accepting the keys in `keys`.
    pub fn new(keys: KeyStore) -> Self {
        Self { keys }
    }
}

impl<S> Layer<S> for ApiKeyAuth {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            keys: self.keys.clone(),
        }
    }
}

/// API key authentication service wrapper.
#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    keys: KeyStore,
}

impl<S> Service<Request<Body>> for ApiKeyAuthService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let keys = self.keys.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            match authorize(&keys, req.headers()) {
                Ok(key) => {
                    debug!(path = %req.uri().path(), "API key authentication successful");
                    req.extensions_mut().insert(key);
                    inner.call(req).await
                }
                // Body is never read on rejection
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}
