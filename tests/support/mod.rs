//! Shared helpers for integration tests
#![allow(dead_code)]

pub mod mock_smtp;

use export_mailer::config::SmtpConfig;
use export_mailer::domain::{Attachment, Message};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub const EXPORT_CONTENT: &[u8] = b"sku,qty,warehouse\nA1,4,BA\nB7,0,MVD\n";

/// Temp directory holding one export file
pub struct ExportDir {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl ExportDir {
    pub fn path_str(&self) -> &str {
        self.path.to_str().expect("utf-8 temp path")
    }
}

pub fn export_file(name: &str, content: &[u8]) -> ExportDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write export file");
    ExportDir { dir, path }
}

pub fn message(recipients: &[&str]) -> Message {
    Message::new(
        "reports@example.com",
        recipients.iter().map(|r| r.to_string()).collect(),
        "Inventory export",
        "Please find the attached file with the latest inventory data.",
        Attachment::new("inventory.csv", EXPORT_CONTENT.to_vec(), "text/csv"),
    )
    .expect("valid message")
}

/// Plain-connection SMTP config pointing at a local port
pub fn local_smtp(port: u16) -> SmtpConfig {
    SmtpConfig {
        host: "127.0.0.1".to_string(),
        port,
        username: Some("reports@example.com".to_string()),
        password: Some("app-password".to_string()),
        use_tls: false,
        timeout: Duration::from_secs(5),
    }
}
