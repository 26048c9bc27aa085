//! Configuration management for Export Mailer

use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SUBJECT: &str = "Inventory export";
pub const DEFAULT_BODY: &str = "Please find the attached file with the latest inventory data.";

/// Per-request timeout shared by both transports
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Sender address (e.g. "Reports <reports@example.com>")
    pub sender: Option<String>,
    /// Email API configuration; `None` when no credential is set
    pub api: Option<ApiConfig>,
    /// SMTP configuration, used only without an API credential
    pub smtp: SmtpConfig,
    /// Message content and distribution list
    pub message: MessageConfig,
    /// Where the export files live
    pub export: ExportConfig,
    /// Log output format: "pretty" or "json"
    pub log_format: String,
}

/// Transactional email API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub endpoint: String,
    /// Optional reply-to, free-form like the recipient list
    pub reply_to: Option<String>,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            reply_to: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }
}

/// SMTP configuration for the fallback transport
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Typically 587 for STARTTLS
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the session with STARTTLS
    pub use_tls: bool,
    pub timeout: Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMTP_HOST.to_string(),
            port: DEFAULT_SMTP_PORT,
            username: None,
            password: None,
            use_tls: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MessageConfig {
    /// Free-form recipient list (comma, semicolon or whitespace separated)
    pub recipients: String,
    pub subject: String,
    pub body: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            recipients: String::new(),
            subject: DEFAULT_SUBJECT.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub dir: PathBuf,
    /// Only consider files with this extension (without the dot)
    pub extension: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extension: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat empty values the same as unset ones
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let sender = var("SENDER_EMAIL");

        let api = var("RESEND_API_KEY").map(|api_key| ApiConfig {
            api_key,
            endpoint: var("RESEND_API_URL").unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            reply_to: var("RESEND_REPLY_TO"),
            timeout: DEFAULT_TIMEOUT,
        });

        let port = var("SMTP_PORT")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_SMTP_PORT);

        let smtp = SmtpConfig {
            host: var("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
            username: var("SMTP_LOGIN").or_else(|| sender.clone()),
            password: var("EMAIL_PASSWORD"),
            use_tls: var("SMTP_USE_TLS")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            timeout: DEFAULT_TIMEOUT,
        };

        let message = MessageConfig {
            recipients: var("RECEIVER_EMAILS").unwrap_or_default(),
            subject: var("EMAIL_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            body: var("EMAIL_BODY").unwrap_or_else(|| DEFAULT_BODY.to_string()),
        };

        let export = ExportConfig {
            dir: var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            extension: var("EXPORT_EXTENSION")
                .map(|ext| ext.trim_start_matches('.').to_string()),
        };

        Ok(Self {
            sender,
            api,
            smtp,
            message,
            export,
            log_format: var("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
        })
    }

    /// Whether the API transport is selected
    pub fn uses_api(&self) -> bool {
        self.api.is_some()
    }
}
