//! Log sink for accepted webhook events.
//!
//! Every accepted delivery produces three INFO lines:
//!
//! ```text
//! [2024-01-15 10:30:05] New OPENS Event
//! API Key: ...c123
//! Data: {"email":"a@b.com"}
//! ```
//!
//! Each line carries `event_id`, `event_type` and `request_id` as structured
//! fields so the lines of one delivery can be grouped in JSON log output.
//! Only the key suffix is ever written.

use tracing::info;

use crate::metrics;
use crate::models::EventRecord;

/// Emit the log lines for an accepted event and count it.
pub fn log_event(record: &EventRecord) {
    let request_id = record.request_id.as_deref().unwrap_or("-");

    for line in record.log_lines() {
        info!(
            event_id = %record.id,
            event_type = record.event_type.as_str(),
            request_id,
            "{line}"
        );
    }

    metrics::record_event_received(record.event_type);
}
