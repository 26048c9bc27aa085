//! Error types for the delivery component

use thiserror::Error;

/// Delivery result type
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Broad failure category, used to decide whether a failure is retryable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing credential or sender
    Configuration,
    /// Bad recipients or missing attachment
    Validation,
    /// Network error or non-success API status
    Transient,
    /// Anything raised during the SMTP conversation
    Smtp,
}

/// Delivery error types
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Sender address is not set")]
    MissingSender,

    #[error("No recipients specified")]
    NoRecipients,

    #[error("File not found: {0}")]
    AttachmentNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("SMTP error: {0}")]
    Smtp(String),
}

impl DeliveryError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotConfigured(_) | Self::MissingSender => ErrorKind::Configuration,
            Self::NoRecipients | Self::AttachmentNotFound(_) | Self::Io(_) => {
                ErrorKind::Validation
            }
            Self::Http(_) | Self::ApiStatus { .. } => ErrorKind::Transient,
            Self::InvalidAddress(_) | Self::Smtp(_) => ErrorKind::Smtp,
        }
    }

    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        DeliveryError::Smtp(err.to_string())
    }
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(err: lettre::error::Error) -> Self {
        DeliveryError::Smtp(err.to_string())
    }
}

impl From<lettre::address::AddressError> for DeliveryError {
    fn from(err: lettre::address::AddressError) -> Self {
        DeliveryError::InvalidAddress(err.to_string())
    }
}
