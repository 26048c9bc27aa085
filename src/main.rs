use anyhow::{bail, Context, Result};
use export_mailer::email::TracingEventSink;
use export_mailer::locator::{FileLocator, LatestFileLocator};
use export_mailer::{telemetry, Config, DeliveryService, SendRequest};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    telemetry::init(&config.log_format);
    info!("Export mailer started");

    let locator = LatestFileLocator::from_config(&config.export);
    let file_path = match locator
        .locate()
        .with_context(|| format!("Failed to scan {}", config.export.dir.display()))?
    {
        Some(path) => path.display().to_string(),
        None => {
            warn!("No export file found in {}", config.export.dir.display());
            String::new()
        }
    };

    let service = DeliveryService::from_config(&config, Arc::new(TracingEventSink))?;
    info!(transport = service.active_transport(), file = %file_path, "Sending export");

    let request = SendRequest::new(
        config.sender.clone().unwrap_or_default(),
        config.message.recipients.clone(),
        config.message.subject.clone(),
        config.message.body.clone(),
        file_path,
    );

    let outcome = service.send_export(&request).await;
    if !outcome.success {
        error!(transport = outcome.transport, "Delivery failed: {}", outcome.detail);
        bail!("delivery failed: {}", outcome.detail);
    }

    info!(
        transport = outcome.transport,
        attempts = outcome.attempts,
        message_id = ?outcome.message_id,
        "{}",
        outcome.detail
    );
    Ok(())
}
