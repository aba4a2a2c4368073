mod health;
pub mod webhooks;

pub use health::{health_check, root};
pub use webhooks::receive_event;
