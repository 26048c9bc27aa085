//! Transactional email HTTPS API transport (Resend-compatible)

use super::events::{DeliveryEvent, EventKind, EventSink};
use super::retry::RetryPolicy;
use super::transport::Transport;
use crate::config::ApiConfig;
use crate::domain::{normalize_recipients, DeliveryOutcome, Message};
use crate::error::{DeliveryError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PROVIDER_NAME: &str = "resend";

/// JSON body accepted by the email API
#[derive(Debug, Serialize)]
pub struct EmailPayload {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<AttachmentPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct AttachmentPayload {
    pub filename: String,
    /// Base64-encoded file content
    pub content: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

/// Email API transport with bounded retries
pub struct ApiTransport {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    reply_to: Vec<String>,
    retry: RetryPolicy,
    events: Arc<dyn EventSink>,
}

impl ApiTransport {
    /// Create the transport from configuration.
    ///
    /// A blank API key means the transport is unavailable.
    pub fn from_config(config: &ApiConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(DeliveryError::NotConfigured(
                "RESEND_API_KEY not set".to_string(),
            ));
        }

        // Redirects count as failures, so never follow them
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let reply_to = config
            .reply_to
            .as_deref()
            .map(normalize_recipients)
            .unwrap_or_default();

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            reply_to,
            retry: RetryPolicy::default(),
            events,
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Build the request body for a message
    pub fn build_payload(&self, message: &Message) -> EmailPayload {
        let attachment = message.attachment();
        EmailPayload {
            from: message.sender().to_string(),
            to: message.recipients().to_vec(),
            subject: message.subject().to_string(),
            text: message.body().to_string(),
            attachments: vec![AttachmentPayload {
                filename: attachment.filename.clone(),
                content: attachment.to_base64(),
                content_type: Some(attachment.content_type.clone()),
            }],
            reply_to: if self.reply_to.is_empty() {
                None
            } else {
                Some(self.reply_to.clone())
            },
        }
    }

    /// One POST; returns the provider message id on success
    async fn post(&self, payload: &EmailPayload) -> Result<Option<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status >= 300 {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::ApiStatus { status, body });
        }

        let id = response
            .json::<SendResponse>()
            .await
            .ok()
            .and_then(|r| r.id);
        Ok(id)
    }

    fn emit(&self, kind: EventKind) {
        self.events.emit(DeliveryEvent::new(PROVIDER_NAME, kind));
    }
}

#[async_trait]
impl Transport for ApiTransport {
    async fn send(&self, message: &Message) -> DeliveryOutcome {
        let payload = self.build_payload(message);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err = match self.post(&payload).await {
                Ok(message_id) => {
                    self.emit(EventKind::Delivered {
                        attempts: attempt,
                        message_id: message_id.clone(),
                    });
                    return DeliveryOutcome::success(
                        PROVIDER_NAME,
                        attempt,
                        message_id,
                        format!("Email sent OK after {} attempt(s)", attempt),
                    );
                }
                Err(err) => err,
            };

            let (status, error) = match &err {
                DeliveryError::ApiStatus { status, body } => (Some(*status), body.clone()),
                other => (None, other.to_string()),
            };
            self.emit(EventKind::AttemptFailed {
                attempt,
                status,
                error,
            });

            let delay = if err.is_retryable() {
                self.retry.delay_after(attempt)
            } else {
                None
            };

            match delay {
                Some(delay) => {
                    self.emit(EventKind::RetryScheduled { attempt, delay });
                    tokio::time::sleep(delay).await;
                }
                None => {
                    self.emit(EventKind::GaveUp { attempts: attempt });
                    return DeliveryOutcome::failure(
                        PROVIDER_NAME,
                        attempt,
                        format!("Giving up after {} attempt(s): {}", attempt, err),
                    );
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
