//! # GMass Webhook Receiver
//!
//! An Axum service that accepts GMass webhook notifications (opens, clicks,
//! replies, bounces, unsubscribes, sends), authenticates them with a shared
//! API key, and writes each accepted event to the log.
//!
//! - **Security**: Constant-time API key checks, redacted key logging
//! - **Observability**: Request IDs, structured logging, Prometheus counters
//! - **Stateless**: No storage; the only shared state is the read-only key set
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → CORS → Body Limit)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ApiKeyAuth (webhook routes only)                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (root, health, receive_event)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Event Logger (tracing)                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gmass_webhook::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let addr = config.server_addr();
//!     let app = build_router(AppState::new(config));
//!
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```bash
//! GMASS_API_KEYS=key-one,key-two PORT=5000 cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use keys::KeyStore;
pub use models::{EventRecord, EventType};
pub use routes::build_router;
pub use state::AppState;
