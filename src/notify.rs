use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("endpoint returned status {status}: {message}")]
    Endpoint { status: u16, message: String },
}

/// Outbound payload: one forwarded file path.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRequest {
    pub path: String,
}

/// Capability seam for forwarding a path to the downstream workflow.
/// Tests substitute a recording fake.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, path: &str) -> Result<(), NotifyError>;
}

/// Forwards paths to the workflow endpoint, one POST per path. No retries;
/// the caller's failure signal drives any redelivery.
#[derive(Debug)]
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpNotifier {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, path: &str) -> Result<(), NotifyError> {
        let body = NotificationRequest {
            path: path.to_string(),
        };

        let response = self.client.post(&self.endpoint).json(&body).send().await;

        match response {
            Ok(response) if response.status().is_success() => {
                info!(path = %path, "Request sent");
                Ok(())
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let message = response.text().await.unwrap_or_default();
                error!(path = %path, status = status, "Notification rejected");
                Err(NotifyError::Endpoint { status, message })
            }
            Err(e) => {
                error!(path = %path, error = %e, "Notification request failed");
                Err(NotifyError::Http(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notifier_stores_endpoint() {
        let notifier = HttpNotifier::new(
            "http://localhost:7106/trigger".to_string(),
            Duration::from_secs(30),
        )
        .unwrap();

        assert_eq!(notifier.endpoint, "http://localhost:7106/trigger");
    }

    #[test]
    fn test_notification_request_shape() {
        let body = NotificationRequest {
            path: "/share/exports/report.csv".to_string(),
        };

        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"path":"/share/exports/report.csv"}"#);
    }
}
