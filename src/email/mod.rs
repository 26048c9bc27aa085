//! Email delivery transports
//!
//! Two transports implement [`Transport`]:
//! - HTTPS email API with bounded retries (preferred)
//! - SMTP with STARTTLS (using lettre), when no API key is configured

pub mod api;
pub mod attachment;
pub mod events;
pub mod retry;
pub mod smtp;
pub mod transport;

pub use api::ApiTransport;
pub use events::{DeliveryEvent, EventKind, EventSink, MemoryEventSink, TracingEventSink};
pub use retry::RetryPolicy;
pub use smtp::SmtpTransport;
pub use transport::Transport;
