//! [`DashboardPoller`] – fixed-interval polling of `GET /api/estado`.
//!
//! The first request is sent as soon as the loop starts; after that one
//! request per interval.  Each tick awaits its request before the next tick
//! can fire, and ticks missed while a slow request was in flight are skipped
//! rather than bunched up, so requests never overlap.
//!
//! A failed tick (connection error, non-2xx status, unreadable body) is
//! reported to the view and logged; the previously displayed snapshot stays
//! on screen and the loop carries on.

use std::future::Future;
use std::time::Duration;

use parkwatch_types::{OccupancyState, ParkError};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::view::DashboardView;

/// Time between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Upper bound on a single poll request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);

/// Timing knobs for [`DashboardPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardPoller
// ---------------------------------------------------------------------------

/// Polls the query endpoint and keeps a [`DashboardView`] in sync.
pub struct DashboardPoller {
    client: reqwest::Client,
    state_url: String,
    config: PollerConfig,
    last: Option<OccupancyState>,
}

impl DashboardPoller {
    /// Create a poller for the server at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// # Errors
    ///
    /// * [`ParkError::Config`] – `config.interval` is zero.
    /// * [`ParkError::Transport`] – the HTTP client cannot be built.
    pub fn new(base_url: &str, config: PollerConfig) -> Result<Self, ParkError> {
        if config.interval.is_zero() {
            return Err(ParkError::Config("poll interval must be greater than zero".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ParkError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            state_url: format!("{}/api/estado", base_url.trim_end_matches('/')),
            config,
            last: None,
        })
    }

    pub fn state_url(&self) -> &str {
        &self.state_url
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// The last snapshot successfully rendered, if any.
    pub fn last_snapshot(&self) -> Option<&OccupancyState> {
        self.last.as_ref()
    }

    /// Fetch the current snapshot once.
    ///
    /// # Errors
    ///
    /// * [`ParkError::Transport`] – connection failure, timeout or non-2xx status.
    /// * [`ParkError::Serialization`] – the body is not an occupancy snapshot.
    pub async fn fetch(&self) -> Result<OccupancyState, ParkError> {
        let response = self
            .client
            .get(&self.state_url)
            .send()
            .await
            .map_err(|e| ParkError::Transport(format!("{} unreachable: {e}", self.state_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParkError::Transport(format!(
                "{} returned HTTP {status}",
                self.state_url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ParkError::Transport(format!("failed to read response body: {e}")))?;
        serde_json::from_slice(&body)
            .map_err(|e| ParkError::Serialization(format!("malformed occupancy snapshot: {e}")))
    }

    /// Run a single tick: fetch, then render on success.
    ///
    /// On failure the view is told about the error and keeps its content.
    pub async fn poll_once<V: DashboardView>(&mut self, view: &mut V) -> Result<(), ParkError> {
        match self.fetch().await {
            Ok(state) => {
                debug!(
                    movement = ?state.last_movement,
                    spaces = state.available_spaces,
                    "snapshot received"
                );
                view.render(&state);
                self.last = Some(state);
                Ok(())
            }
            Err(e) => {
                view.report_error(&e);
                Err(e)
            }
        }
    }

    /// Poll for as long as the dashboard lives.
    pub async fn run<V: DashboardView>(&mut self, view: &mut V) {
        self.run_until(view, std::future::pending()).await;
    }

    /// Poll until `shutdown` resolves.
    pub async fn run_until<V, F>(&mut self, view: &mut V, shutdown: F)
    where
        V: DashboardView,
        F: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(url = %self.state_url, interval_ms = self.config.interval.as_millis() as u64, "dashboard polling started");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    // errors are already reported to the view
                    let _ = self.poll_once(view).await;
                }
            }
        }

        info!("dashboard polling stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{Router, routing::get};
    use parkwatch_server::router;
    use parkwatch_store::StateStore;
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct RecordingView {
        rendered: Vec<OccupancyState>,
        errors: Vec<ParkError>,
    }

    impl DashboardView for RecordingView {
        fn render(&mut self, state: &OccupancyState) {
            self.rendered.push(state.clone());
        }

        fn report_error(&mut self, err: &ParkError) {
            self.errors.push(err.clone());
        }
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn default_config_polls_every_second() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_millis(1000));
        assert_eq!(config.request_timeout, Duration::from_millis(3000));
    }

    #[test]
    fn state_url_strips_trailing_slash() {
        let poller = DashboardPoller::new("http://localhost:3000/", PollerConfig::default()).unwrap();
        assert_eq!(poller.state_url(), "http://localhost:3000/api/estado");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = PollerConfig {
            interval: Duration::ZERO,
            ..PollerConfig::default()
        };
        let err = DashboardPoller::new("http://localhost:3000", config).err();
        assert!(matches!(err, Some(ParkError::Config(_))));
    }

    #[tokio::test]
    async fn poll_once_renders_server_state() {
        let store = Arc::new(StateStore::new());
        store.write("entrada", 5);
        let base = serve(router(Arc::clone(&store))).await;

        let mut poller = DashboardPoller::new(&base, PollerConfig::default()).unwrap();
        let mut view = RecordingView::default();
        poller.poll_once(&mut view).await.unwrap();

        assert_eq!(view.rendered, vec![OccupancyState::new("entrada", 5)]);
        assert_eq!(poller.last_snapshot(), Some(&OccupancyState::new("entrada", 5)));
    }

    #[tokio::test]
    async fn unreachable_server_keeps_previous_display() {
        let store = Arc::new(StateStore::new());
        store.write("salida", 9);
        let base = serve(router(Arc::clone(&store))).await;

        let mut poller = DashboardPoller::new(&base, PollerConfig::default()).unwrap();
        let mut view = RecordingView::default();
        poller.poll_once(&mut view).await.unwrap();

        // Point the poller at a port nobody listens on.
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);
        poller.state_url = format!("{dead}/api/estado");

        let err = poller.poll_once(&mut view).await.unwrap_err();
        assert!(matches!(err, ParkError::Transport(_)));
        assert_eq!(view.rendered.len(), 1);
        assert_eq!(view.errors.len(), 1);
        assert_eq!(poller.last_snapshot(), Some(&OccupancyState::new("salida", 9)));
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let app = Router::new().route(
            "/api/estado",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let base = serve(app).await;

        let mut poller = DashboardPoller::new(&base, PollerConfig::default()).unwrap();
        let mut view = RecordingView::default();
        let err = poller.poll_once(&mut view).await.unwrap_err();

        assert!(matches!(err, ParkError::Transport(_)));
        assert!(view.rendered.is_empty());
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let app = Router::new().route("/api/estado", get(|| async { "not a snapshot" }));
        let base = serve(app).await;

        let mut poller = DashboardPoller::new(&base, PollerConfig::default()).unwrap();
        let mut view = RecordingView::default();
        let err = poller.poll_once(&mut view).await.unwrap_err();

        assert!(matches!(err, ParkError::Serialization(_)));
        assert!(view.rendered.is_empty());
        assert!(poller.last_snapshot().is_none());
    }

    #[tokio::test]
    async fn first_poll_fires_without_waiting_for_the_interval() {
        let store = Arc::new(StateStore::new());
        let base = serve(router(Arc::clone(&store))).await;

        let config = PollerConfig {
            interval: Duration::from_secs(60),
            ..PollerConfig::default()
        };
        let mut poller = DashboardPoller::new(&base, config).unwrap();
        let mut view = RecordingView::default();
        poller
            .run_until(&mut view, tokio::time::sleep(Duration::from_millis(500)))
            .await;

        assert_eq!(view.rendered, vec![OccupancyState::default()]);
    }

    #[tokio::test]
    async fn loop_keeps_polling_and_picks_up_new_state() {
        let store = Arc::new(StateStore::new());
        let base = serve(router(Arc::clone(&store))).await;

        let config = PollerConfig {
            interval: Duration::from_millis(50),
            ..PollerConfig::default()
        };
        let mut poller = DashboardPoller::new(&base, config).unwrap();
        let mut view = RecordingView::default();

        let writer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(120)).await;
                store.write("entrada", 3);
            })
        };
        poller
            .run_until(&mut view, tokio::time::sleep(Duration::from_millis(400)))
            .await;
        writer.await.unwrap();

        assert!(view.rendered.len() >= 3);
        assert_eq!(view.rendered.first(), Some(&OccupancyState::default()));
        assert_eq!(view.rendered.last(), Some(&OccupancyState::new("entrada", 3)));
    }
}
