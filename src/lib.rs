//! Export Mailer - delivers the latest export file by email
//!
//! This crate locates the newest export artifact and sends it as an
//! attachment, preferring a transactional email HTTPS API and using SMTP
//! when no API credential is configured.

pub mod config;
pub mod domain;
pub mod email;
pub mod error;
pub mod locator;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use config::Config;
pub use domain::{DeliveryOutcome, Message, SendRequest};
pub use error::{DeliveryError, Result};
pub use service::DeliveryService;
