//! [`StreamWatcher`] – push-based alternative to the poller.
//!
//! Connects to `GET /api/estado/ws`; the server sends the current snapshot on
//! connect and one frame per accepted report afterwards.  When the connection
//! drops the watcher waits `retry_delay` and reconnects, keeping the last
//! snapshot on screen meanwhile.

use std::future::Future;
use std::time::Duration;

use futures_util::StreamExt;
use parkwatch_types::{OccupancyState, ParkError};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::view::DashboardView;

pub struct StreamWatcher {
    ws_url: String,
    retry_delay: Duration,
}

impl StreamWatcher {
    /// Watch the server at `base_url` (`http://` or `https://`).
    pub fn new(base_url: &str, retry_delay: Duration) -> Self {
        let base = base_url.trim_end_matches('/');
        let ws_base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            base.to_string()
        };
        Self {
            ws_url: format!("{ws_base}/api/estado/ws"),
            retry_delay,
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Render frames from one connection until it closes.
    ///
    /// Returns the number of snapshots rendered.
    ///
    /// # Errors
    ///
    /// [`ParkError::Transport`] when the connection cannot be opened or breaks.
    /// Frames that do not parse as a snapshot are logged and skipped.
    pub async fn watch_once<V: DashboardView>(&self, view: &mut V) -> Result<usize, ParkError> {
        let (mut ws, _) = connect_async(self.ws_url.as_str())
            .await
            .map_err(|e| ParkError::Transport(format!("{} unreachable: {e}", self.ws_url)))?;
        debug!(url = %self.ws_url, "state stream connected");

        let mut rendered = 0;
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<OccupancyState>(text.as_str()) {
                        Ok(state) => {
                            view.render(&state);
                            rendered += 1;
                        }
                        Err(e) => {
                            let err = ParkError::Serialization(format!("malformed frame: {e}"));
                            view.report_error(&err);
                        }
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ParkError::Transport(format!("state stream broke: {e}")));
                }
            }
        }
        Ok(rendered)
    }

    /// Watch until `shutdown` resolves, reconnecting after failures.
    pub async fn run_until<V, F>(&self, view: &mut V, shutdown: F)
    where
        V: DashboardView,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!(url = %self.ws_url, "dashboard stream started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                result = self.watch_once(view) => {
                    match result {
                        Ok(n) => debug!(rendered = n, "state stream closed by server"),
                        Err(e) => {
                            warn!(error = %e, "state stream failed");
                            view.report_error(&e);
                        }
                    }
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        info!("dashboard stream stopped");
    }
}
