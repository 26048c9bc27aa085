//! SMTP transport implementation using lettre

use super::events::{DeliveryEvent, EventKind, EventSink};
use super::transport::Transport;
use crate::config::SmtpConfig;
use crate::domain::{DeliveryOutcome, Message, DEFAULT_CONTENT_TYPE};
use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use lettre::{
    message::{
        header::{ContentTransferEncoding, ContentType},
        Attachment, Body, Mailbox, MultiPart, SinglePart,
    },
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};
use std::sync::Arc;

const PROVIDER_NAME: &str = "smtp";

/// SMTP transport, used when no API credential is configured
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    events: Arc<dyn EventSink>,
}

impl SmtpTransport {
    /// Create the transport from configuration
    pub fn from_config(config: &SmtpConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        let mut builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| DeliveryError::NotConfigured(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        builder = builder.port(config.port).timeout(Some(config.timeout));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            events,
        })
    }

    /// Compose the multipart MIME document for a message
    pub fn build_email(message: &Message) -> Result<lettre::Message> {
        let from: Mailbox = message.sender().parse()?;

        let mut builder = lettre::Message::builder()
            .from(from)
            .subject(message.subject());
        for recipient in message.recipients() {
            let to: Mailbox = recipient.parse()?;
            builder = builder.to(to);
        }

        let attachment = message.attachment();
        let content_type = ContentType::parse(&attachment.content_type)
            .or_else(|_| ContentType::parse(DEFAULT_CONTENT_TYPE))
            .map_err(|e| DeliveryError::Smtp(e.to_string()))?;
        let body = Body::new_with_encoding(attachment.content.clone(), ContentTransferEncoding::Base64)
            .map_err(|_| DeliveryError::Smtp("attachment could not be base64 encoded".to_string()))?;

        let email = builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(message.body().to_string()))
                .singlepart(Attachment::new(attachment.filename.clone()).body(body, content_type)),
        )?;

        Ok(email)
    }

    async fn deliver(&self, email: lettre::Message) -> Result<Option<String>> {
        let response = self.transport.send(email).await?;
        let reply = response.message().next().map(|line| line.to_string());
        Ok(reply)
    }

    fn fail(&self, attempts: u32, err: DeliveryError) -> DeliveryOutcome {
        let error = err.to_string();
        self.emit(EventKind::SmtpFailed {
            error: error.clone(),
        });
        DeliveryOutcome::failure(
            PROVIDER_NAME,
            attempts,
            format!("Failed to send email: {}", error),
        )
    }

    fn emit(&self, kind: EventKind) {
        self.events.emit(DeliveryEvent::new(PROVIDER_NAME, kind));
    }
}

#[async_trait]
impl Transport for SmtpTransport {
    async fn send(&self, message: &Message) -> DeliveryOutcome {
        // Nothing is sent when the message cannot be composed
        let email = match Self::build_email(message) {
            Ok(email) => email,
            Err(e) => return self.fail(0, e),
        };

        match self.deliver(email).await {
            Ok(message_id) => {
                self.emit(EventKind::Delivered {
                    attempts: 1,
                    message_id: message_id.clone(),
                });
                DeliveryOutcome::success(
                    PROVIDER_NAME,
                    1,
                    message_id,
                    "Email sent successfully",
                )
            }
            Err(e) => self.fail(1, e),
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
