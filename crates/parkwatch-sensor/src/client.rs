//! HTTP client for the ingest endpoint.

use std::time::Duration;

use parkwatch_types::{ErrorBody, MovementReport, ParkError};
use tracing::{debug, info};

/// Posts [`MovementReport`]s to a parkwatch server.
#[derive(Debug, Clone)]
pub struct SensorClient {
    client: reqwest::Client,
    ingest_url: String,
}

impl SensorClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`ParkError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ParkError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ParkError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            ingest_url: format!("{}/api/movimiento", base_url.trim_end_matches('/')),
        })
    }

    pub fn ingest_url(&self) -> &str {
        &self.ingest_url
    }

    /// Report `movement` together with the authoritative free-space count.
    pub async fn report(&self, movement: &str, spaces: u32) -> Result<(), ParkError> {
        self.send(&MovementReport::new(movement, spaces)).await
    }

    /// Post a raw report.
    ///
    /// # Errors
    ///
    /// * [`ParkError::InvalidInput`] – the server rejected the report (HTTP 400);
    ///   the payload is the server's error message.
    /// * [`ParkError::Transport`] – the server is unreachable or answered with
    ///   any other non-2xx status.
    pub async fn send(&self, report: &MovementReport) -> Result<(), ParkError> {
        let response = self
            .client
            .post(&self.ingest_url)
            .json(report)
            .send()
            .await
            .map_err(|e| ParkError::Transport(format!("{} unreachable: {e}", self.ingest_url)))?;

        let status = response.status();
        if status.is_success() {
            info!(movement = ?report.movement, spaces = ?report.spaces, "report accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, body = %body, "report refused");
        if status == reqwest::StatusCode::BAD_REQUEST {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(ParkError::InvalidInput(message));
        }
        Err(ParkError::Transport(format!(
            "{} returned HTTP {status}",
            self.ingest_url
        )))
    }
}
