//! [`ParkServer`] – HTTP server for the occupancy API and dashboard.
//!
//! Listens on `0.0.0.0:3000` (configurable via [`ParkServer::with_host`] and
//! [`ParkServer::with_port`]) and wraps the [`router`] with request tracing,
//! permissive CORS for the sensor device, and a per-request timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use parkwatch_store::StateStore;
use parkwatch_types::ParkError;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::routes::router;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind address (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Upper bound on the time spent producing a response.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// ParkServer
// ---------------------------------------------------------------------------

/// HTTP server exposing the [`StateStore`] to the sensor device and the
/// dashboards.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use parkwatch_store::StateStore;
/// use parkwatch_server::ParkServer;
///
/// #[tokio::main]
/// async fn main() {
///     let store = Arc::new(StateStore::new());
///     ParkServer::new(store)
///         .with_port(8080)
///         .run()
///         .await
///         .expect("parkwatch server failed");
/// }
/// ```
pub struct ParkServer {
    store: Arc<StateStore>,
    host: String,
    port: u16,
    request_timeout: Duration,
}

impl ParkServer {
    /// Create a server backed by `store` on [`DEFAULT_HOST`]:[`DEFAULT_PORT`].
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the bind address (builder-style).
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Override the listening port (builder-style).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the per-request timeout (builder-style).
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// `host:port` string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The fully layered application.
    pub fn app(&self) -> Router {
        with_middleware(router(Arc::clone(&self.store)), self.request_timeout)
    }

    /// Bind and serve until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ParkError::Bind`] if the TCP listener cannot bind, or
    /// [`ParkError::Transport`] if the accept loop fails.
    pub async fn run(self) -> Result<(), ParkError> {
        let addr = self.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ParkError::Bind {
                addr: addr.clone(),
                details: e.to_string(),
            })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ParkError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.bind_addr());
        info!(addr = %local, "parkwatch server listening");

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ParkError::Transport(format!("server error on {local}: {e}")))?;

        info!("parkwatch server stopped");
        Ok(())
    }
}

/// Wrap `routes` with request tracing, permissive CORS and a `timeout` after
/// which the client gets `408 Request Timeout`.
pub fn with_middleware(routes: Router, timeout: Duration) -> Router {
    routes
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, shutting down"),
        Err(e) => {
            warn!(error = %e, "failed to install Ctrl-C handler; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
