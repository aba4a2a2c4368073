mod api;
mod event;

pub use api::{AckResponse, HealthResponse, StatusResponse};
pub use event::{EventRecord, EventType, ParseEventTypeError};
