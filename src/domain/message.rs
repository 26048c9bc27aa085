//! Message, attachment and outcome types

use crate::error::{DeliveryError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Generic type used when the extension gives no hint
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content,
            content_type: content_type.into(),
        }
    }

    /// Standard base64 with padding
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.content)
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Raw inputs for one delivery, as supplied by the caller
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    pub sender: String,
    /// Free-form recipient string
    pub recipients: String,
    pub subject: String,
    pub body: String,
    pub file_path: String,
}

impl SendRequest {
    pub fn new(
        sender: impl Into<String>,
        recipients: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipients: recipients.into(),
            subject: subject.into(),
            body: body.into(),
            file_path: file_path.into(),
        }
    }
}

/// Fully prepared email with exactly one attachment
///
/// Only built through [`Message::new`], which rejects a blank sender and an
/// empty recipient list. Not mutated after construction.
#[derive(Debug, Clone)]
pub struct Message {
    sender: String,
    recipients: Vec<String>,
    subject: String,
    body: String,
    attachment: Attachment,
}

impl Message {
    pub fn new(
        sender: impl Into<String>,
        recipients: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        attachment: Attachment,
    ) -> Result<Self> {
        let sender = sender.into().trim().to_string();
        if sender.is_empty() {
            return Err(DeliveryError::MissingSender);
        }
        if recipients.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        Ok(Self {
            sender,
            recipients,
            subject: subject.into(),
            body: body.into(),
            attachment,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipients(&self) -> &[String] {
        &self.recipients
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }
}

/// Result of one transport attempt sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub success: bool,
    /// Name of the transport that produced the outcome
    pub transport: &'static str,
    /// Human-readable status line
    pub detail: String,
    /// Network attempts made (0 when rejected before any I/O)
    pub attempts: u32,
    /// Provider message identifier, when the provider returned one
    pub message_id: Option<String>,
}

impl DeliveryOutcome {
    pub fn success(
        transport: &'static str,
        attempts: u32,
        message_id: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            transport,
            detail: detail.into(),
            attempts,
            message_id,
        }
    }

    pub fn failure(transport: &'static str, attempts: u32, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            transport,
            detail: detail.into(),
            attempts,
            message_id: None,
        }
    }
}
