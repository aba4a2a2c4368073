use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keys::key_suffix;

/// Webhook event categories sent by GMass.
///
/// Each variant owns one `POST /webhook/<name>` route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Opens,
    Clicks,
    Replies,
    Bounces,
    Unsubscribes,
    Sends,
}

impl EventType {
    /// All event types, in route registration order.
    pub const ALL: [EventType; 6] = [
        EventType::Opens,
        EventType::Clicks,
        EventType::Replies,
        EventType::Bounces,
        EventType::Unsubscribes,
        EventType::Sends,
    ];

    /// Lowercase name as used in the route path.
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Opens => "opens",
            EventType::Clicks => "clicks",
            EventType::Replies => "replies",
            EventType::Bounces => "bounces",
            EventType::Unsubscribes => "unsubscribes",
            EventType::Sends => "sends",
        }
    }

    /// Uppercase label used in log output.
    pub fn label(self) -> &'static str {
        match self {
            EventType::Opens => "OPENS",
            EventType::Clicks => "CLICKS",
            EventType::Replies => "REPLIES",
            EventType::Bounces => "BOUNCES",
            EventType::Unsubscribes => "UNSUBSCRIBES",
            EventType::Sends => "SENDS",
        }
    }

    /// Route path receiving this event type.
    pub fn path(self) -> &'static str {
        match self {
            EventType::Opens => "/webhook/opens",
            EventType::Clicks => "/webhook/clicks",
            EventType::Replies => "/webhook/replies",
            EventType::Bounces => "/webhook/bounces",
            EventType::Unsubscribes => "/webhook/unsubscribes",
            EventType::Sends => "/webhook/sends",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event type name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type: {0}")]
pub struct ParseEventTypeError(pub String);

impl FromStr for EventType {
    type Err = ParseEventTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEventTypeError(s.to_string()))
    }
}

/// A single accepted webhook delivery.
///
/// Lives only for the duration of one request: built by the handler,
/// handed to the event logger, then dropped.
#[derive(Debug, Clone)]
pub struct EventRecord {
    /// Correlates the log lines of one delivery
    pub id: Uuid,
    pub event_type: EventType,
    /// Local wall-clock time the delivery was accepted
    pub timestamp: DateTime<Local>,
    /// Last four characters of the presented API key
    pub key_suffix: String,
    pub payload: serde_json::Value,
    /// Value of `x-request-id`, if the request carried one
    pub request_id: Option<String>,
}

impl EventRecord {
    /// Create a record for an accepted delivery, stamped with the current time.
    ///
    /// Only the suffix of `api_key` is retained.
    pub fn new(event_type: EventType, api_key: &str, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            timestamp: Local::now(),
            key_suffix: key_suffix(api_key).to_string(),
            payload,
            request_id: None,
        }
    }

    /// Attach the propagated request ID.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// The three human-readable lines written for this event.
    pub fn log_lines(&self) -> [String; 3] {
        [
            format!(
                "[{}] New {} Event",
                self.timestamp.format("%Y-%m-%d %H:%M:%S"),
                self.event_type.label()
            ),
            format!("API Key: ...{}", self.key_suffix),
            format!("Data: {}", self.payload),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_label_is_uppercase_name() {
        for event_type in EventType::ALL {
            assert_eq!(event_type.label(), event_type.as_str().to_uppercase());
        }
    }

    #[test]
    fn test_path_matches_name() {
        for event_type in EventType::ALL {
            assert_eq!(event_type.path(), format!("/webhook/{event_type}"));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("bounces".parse::<EventType>().unwrap(), EventType::Bounces);
        assert!("BOUNCES".parse::<EventType>().is_err());
        assert!("deliveries".parse::<EventType>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EventType::Unsubscribes).unwrap();
        assert_eq!(json, "\"unsubscribes\"");
    }

    #[test]
    fn test_record_keeps_only_suffix() {
        let record = EventRecord::new(EventType::Opens, "abc123", json!({}));
        assert_eq!(record.key_suffix, "c123");
        assert!(record.request_id.is_none());
    }

    #[test]
    fn test_log_lines_format() {
        let mut record = EventRecord::new(
            EventType::Opens,
            "abc123",
            json!({"email": "a@b.com"}),
        );
        record.timestamp = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 5).unwrap();

        let [header, key, data] = record.log_lines();
        assert_eq!(header, "[2024-01-15 10:30:05] New OPENS Event");
        assert_eq!(key, "API Key: ...c123");
        assert_eq!(data, r#"Data: {"email":"a@b.com"}"#);
    }
}
