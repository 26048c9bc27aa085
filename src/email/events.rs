//! Structured delivery events
//!
//! Transports and the delivery service report progress through an
//! [`EventSink`] instead of logging directly. The default sink forwards
//! everything to `tracing`; tests use [`MemoryEventSink`] to assert on the
//! exact sequence of events.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;

/// What happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Transport skipped because it has no configuration
    TransportUnavailable { reason: String },
    /// Recipient string had no address token; raw input kept as-is
    RecipientFallback { raw: String },
    /// Request rejected before any network I/O
    ValidationFailed { reason: String },
    AttachmentPrepared { path: String, size: usize },
    AttachmentMissing { path: String },
    AttemptFailed {
        attempt: u32,
        status: Option<u16>,
        error: String,
    },
    RetryScheduled { attempt: u32, delay: Duration },
    Delivered {
        attempts: u32,
        message_id: Option<String>,
    },
    GaveUp { attempts: u32 },
    SmtpFailed { error: String },
}

impl EventKind {
    pub fn level(&self) -> Level {
        match self {
            Self::AttachmentPrepared { .. } | Self::Delivered { .. } => Level::INFO,
            Self::TransportUnavailable { .. }
            | Self::RecipientFallback { .. }
            | Self::AttemptFailed { .. }
            | Self::RetryScheduled { .. } => Level::WARN,
            Self::ValidationFailed { .. }
            | Self::AttachmentMissing { .. }
            | Self::GaveUp { .. }
            | Self::SmtpFailed { .. } => Level::ERROR,
        }
    }

    /// Short machine-friendly name
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransportUnavailable { .. } => "transport_unavailable",
            Self::RecipientFallback { .. } => "recipient_fallback",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::AttachmentPrepared { .. } => "attachment_prepared",
            Self::AttachmentMissing { .. } => "attachment_missing",
            Self::AttemptFailed { .. } => "attempt_failed",
            Self::RetryScheduled { .. } => "retry_scheduled",
            Self::Delivered { .. } => "delivered",
            Self::GaveUp { .. } => "gave_up",
            Self::SmtpFailed { .. } => "smtp_failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportUnavailable { reason } => write!(f, "{}; skipping", reason),
            Self::RecipientFallback { raw } => {
                write!(f, "No address found in recipient list, using raw value: {}", raw)
            }
            Self::ValidationFailed { reason } => write!(f, "{}", reason),
            Self::AttachmentPrepared { path, size } => {
                write!(f, "Attachment prepared: {} ({} bytes)", path, size)
            }
            Self::AttachmentMissing { path } => write!(f, "File not found: {}", path),
            Self::AttemptFailed {
                attempt,
                status: Some(status),
                error,
            } => write!(f, "Attempt {} failed with API error {}: {}", attempt, status, error),
            Self::AttemptFailed {
                attempt,
                status: None,
                error,
            } => write!(f, "Attempt {} failed: {}", attempt, error),
            Self::RetryScheduled { attempt, delay } => {
                write!(f, "Retrying after attempt {} in {:?}", attempt, delay)
            }
            Self::Delivered { attempts, .. } => {
                write!(f, "Email sent OK after {} attempt(s)", attempts)
            }
            Self::GaveUp { attempts } => write!(f, "Giving up after {} attempts", attempts),
            Self::SmtpFailed { error } => write!(f, "Failed to send email: {}", error),
        }
    }
}

/// One emitted event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryEvent {
    pub timestamp: DateTime<Utc>,
    /// Transport tag, e.g. "resend" or "smtp"
    pub transport: &'static str,
    pub kind: EventKind,
}

impl DeliveryEvent {
    pub fn new(transport: &'static str, kind: EventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            transport,
            kind,
        }
    }

    pub fn level(&self) -> Level {
        self.kind.level()
    }
}

/// Receiver for delivery events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DeliveryEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: DeliveryEvent) {
        let transport = event.transport;
        let name = event.kind.name();
        let at = event.timestamp.to_rfc3339();
        let level = event.level();
        if level == Level::ERROR {
            tracing::error!(transport, event = name, at = %at, "{}", event.kind);
        } else if level == Level::WARN {
            tracing::warn!(transport, event = name, at = %at, "{}", event.kind);
        } else {
            tracing::info!(transport, event = name, at = %at, "{}", event.kind);
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<DeliveryEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DeliveryEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }

    /// Delays of every scheduled retry, in order
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.kinds()
            .into_iter()
            .filter_map(|kind| match kind {
                EventKind::RetryScheduled { delay, .. } => Some(delay),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: DeliveryEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_levels() {
        assert_eq!(
            EventKind::Delivered {
                attempts: 1,
                message_id: None
            }
            .level(),
            Level::INFO
        );
        assert_eq!(
            EventKind::RetryScheduled {
                attempt: 1,
                delay: Duration::from_secs(2)
            }
            .level(),
            Level::WARN
        );
        assert_eq!(EventKind::GaveUp { attempts: 3 }.level(), Level::ERROR);
    }

    #[test]
    fn test_event_display() {
        let kind = EventKind::AttemptFailed {
            attempt: 2,
            status: Some(500),
            error: "boom".to_string(),
        };
        assert_eq!(kind.to_string(), "Attempt 2 failed with API error 500: boom");

        let kind = EventKind::AttachmentMissing {
            path: "/tmp/none.csv".to_string(),
        };
        assert_eq!(kind.to_string(), "File not found: /tmp/none.csv");
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemoryEventSink::new();
        sink.emit(DeliveryEvent::new(
            "resend",
            EventKind::RetryScheduled {
                attempt: 1,
                delay: Duration::from_secs(2),
            },
        ));
        sink.emit(DeliveryEvent::new("resend", EventKind::GaveUp { attempts: 3 }));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].transport, "resend");
        assert!(events[0].timestamp <= events[1].timestamp);
        assert_eq!(sink.retry_delays(), vec![Duration::from_secs(2)]);
    }

    #[test]
    fn test_memory_sink_clones_share_storage() {
        let sink = MemoryEventSink::new();
        let handle = sink.clone();
        handle.emit(DeliveryEvent::new("smtp", EventKind::SmtpFailed {
            error: "535".to_string(),
        }));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_tracing_sink_does_not_panic() {
        TracingEventSink.emit(DeliveryEvent::new(
            "smtp",
            EventKind::ValidationFailed {
                reason: "No recipients specified".to_string(),
            },
        ));
    }
}
