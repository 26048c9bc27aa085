//! Delivery service: picks a transport and prepares the message

use crate::config::Config;
use crate::domain::{DeliveryOutcome, Message, RecipientList, SendRequest};
use crate::email::events::{DeliveryEvent, EventKind, EventSink};
use crate::email::{attachment, ApiTransport, SmtpTransport, Transport};
use crate::error::{DeliveryError, Result};
use std::sync::Arc;

/// Tag used for events about the API path when it is skipped
const API_TAG: &str = "resend";

/// Orchestrates one export delivery
///
/// When an API transport is present it is used exclusively, even if it
/// fails. SMTP is only used when no API credential is configured.
pub struct DeliveryService {
    api: Option<Arc<dyn Transport>>,
    smtp: Arc<dyn Transport>,
    events: Arc<dyn EventSink>,
}

impl DeliveryService {
    /// Build both transports from configuration
    pub fn from_config(config: &Config, events: Arc<dyn EventSink>) -> Result<Self> {
        let api = match &config.api {
            Some(api_config) => {
                let transport: Arc<dyn Transport> =
                    Arc::new(ApiTransport::from_config(api_config, events.clone())?);
                Some(transport)
            }
            None => None,
        };
        let smtp = Arc::new(SmtpTransport::from_config(&config.smtp, events.clone())?);

        Ok(Self::with_transports(api, smtp, events))
    }

    /// Build from already constructed transports
    pub fn with_transports(
        api: Option<Arc<dyn Transport>>,
        smtp: Arc<dyn Transport>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self { api, smtp, events }
    }

    /// Name of the transport the next send will use
    pub fn active_transport(&self) -> &'static str {
        self.select().name()
    }

    /// Deliver the export described by `request`.
    ///
    /// Never returns an error: validation and transport failures come back
    /// as a failed outcome and are reported through the event sink.
    pub async fn send_export(&self, request: &SendRequest) -> DeliveryOutcome {
        if self.api.is_none() {
            self.emit(
                API_TAG,
                EventKind::TransportUnavailable {
                    reason: "RESEND_API_KEY not set".to_string(),
                },
            );
        }

        let transport = self.select();
        let tag = transport.name();

        let message = match self.prepare(request, tag).await {
            Ok(message) => message,
            Err(e) => return DeliveryOutcome::failure(tag, 0, e.to_string()),
        };

        transport.send(&message).await
    }

    fn select(&self) -> &Arc<dyn Transport> {
        self.api.as_ref().unwrap_or(&self.smtp)
    }

    /// Validate inputs and read the attachment; no network I/O happens here
    async fn prepare(&self, request: &SendRequest, tag: &'static str) -> Result<Message> {
        if request.sender.trim().is_empty() {
            return Err(self.reject(tag, DeliveryError::MissingSender));
        }

        let recipients = RecipientList::parse(&request.recipients);
        if recipients.is_fallback() {
            self.emit(
                tag,
                EventKind::RecipientFallback {
                    raw: request.recipients.trim().to_string(),
                },
            );
        }
        if recipients.is_empty() {
            return Err(self.reject(tag, DeliveryError::NoRecipients));
        }

        let attachment = match attachment::prepare(&request.file_path).await {
            Ok(attachment) => {
                self.emit(
                    tag,
                    EventKind::AttachmentPrepared {
                        path: request.file_path.clone(),
                        size: attachment.size(),
                    },
                );
                attachment
            }
            Err(DeliveryError::AttachmentNotFound(path)) => {
                self.emit(tag, EventKind::AttachmentMissing { path: path.clone() });
                return Err(DeliveryError::AttachmentNotFound(path));
            }
            Err(e) => return Err(self.reject(tag, e)),
        };

        Message::new(
            request.sender.as_str(),
            recipients.into_vec(),
            request.subject.as_str(),
            request.body.as_str(),
            attachment,
        )
    }

    fn reject(&self, tag: &'static str, err: DeliveryError) -> DeliveryError {
        self.emit(
            tag,
            EventKind::ValidationFailed {
                reason: err.to_string(),
            },
        );
        err
    }

    fn emit(&self, tag: &'static str, kind: EventKind) {
        self.events.emit(DeliveryEvent::new(tag, kind));
    }
}
