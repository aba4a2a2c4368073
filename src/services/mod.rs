//! Business logic behind the HTTP handlers.

pub mod event_logger;

pub use event_logger::log_event;
