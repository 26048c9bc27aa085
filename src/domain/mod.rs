//! Domain types for export delivery

pub mod message;
pub mod recipients;

pub use message::{Attachment, DeliveryOutcome, Message, SendRequest, DEFAULT_CONTENT_TYPE};
pub use recipients::{normalize_recipients, RecipientList};
