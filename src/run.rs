use crate::config::{ConfigError, RelayConfig};
use crate::ingest::{start_server, IngestState};
use crate::notify::{HttpNotifier, NotifyError};
use crate::processor::BatchEventProcessor;
use std::sync::Arc;
use thiserror::Error;
use tokio::signal;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("notifier error: {0}")]
    Notifier(#[from] NotifyError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

pub async fn run() -> Result<(), RunError> {
    let config = RelayConfig::from_env()?;
    info!(
        endpoint = %config.notify_endpoint,
        filter = ?config.target_path_filter,
        "Configuration loaded"
    );

    let notifier = Arc::new(HttpNotifier::new(
        config.notify_endpoint.clone(),
        config.notify_timeout,
    )?);
    let processor = BatchEventProcessor::new(notifier, config.target_path_filter.clone());
    let state = Arc::new(IngestState { processor });

    let mut server = tokio::spawn(start_server(config.listen, state));

    info!("Relay started, press Ctrl+C to shutdown");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            server.abort();
        }
        result = &mut server => {
            match result {
                Ok(Ok(())) => info!("Ingest server stopped"),
                Ok(Err(e)) => {
                    error!(error = %e, "Ingest server error");
                    return Err(e.into());
                }
                Err(e) => error!(error = %e, "Ingest server join error"),
            }
        }
    }

    info!("Relay shutdown complete");

    Ok(())
}
