//! Transport trait shared by the API and SMTP paths

use crate::domain::{DeliveryOutcome, Message};
use async_trait::async_trait;

/// A delivery mechanism capable of sending a [`Message`]
///
/// Implementations never return errors: every failure is reported through
/// the outcome and the transport's event sink.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the message, retrying internally if the transport supports it
    async fn send(&self, message: &Message) -> DeliveryOutcome;

    /// Transport tag used in events and outcomes
    fn name(&self) -> &'static str;
}
