//! `parkwatch-server` – The Occupancy Web Server
//!
//! Boots an HTTP server (default `0.0.0.0:3000`) that:
//!
//! 1. **Ingests** occupancy reports from the sensor device on
//!    `POST /api/movimiento` and stores them in the shared [`StateStore`].
//! 2. **Serves** the latest snapshot on `GET /api/estado` and pushes every
//!    new snapshot over the `GET /api/estado/ws` WebSocket.
//! 3. **Hosts** the browser dashboard (HTML/CSS/JS compiled into the binary)
//!    at `/`, `/app.js` and `/style.css`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use parkwatch_store::StateStore;
//! use parkwatch_server::ParkServer;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(StateStore::new());
//!     ParkServer::new(Arc::clone(&store))
//!         .run()
//!         .await
//!         .expect("parkwatch server failed");
//! }
//! ```
//!
//! [`StateStore`]: parkwatch_store::StateStore

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::router;
pub use server::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT, ParkServer, with_middleware};
