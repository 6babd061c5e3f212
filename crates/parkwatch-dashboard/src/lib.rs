//! `parkwatch-dashboard` – Native Occupancy Dashboard
//!
//! Keeps a display synchronised with the server's occupancy snapshot.
//!
//! # Modules
//!
//! - [`poller`] – [`DashboardPoller`]: fetches `GET /api/estado` once per
//!   interval (first fetch immediately) and hands every successful snapshot
//!   to a [`DashboardView`].  Failed ticks are logged and leave the view as it
//!   was.
//! - [`stream`] – [`StreamWatcher`]: the push alternative, subscribing to
//!   `GET /api/estado/ws` and rendering every frame as it arrives.
//! - [`view`] – the [`DashboardView`] trait and the colored [`TerminalView`].

pub mod poller;
pub mod stream;
pub mod view;

pub use poller::{DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT, DashboardPoller, PollerConfig};
pub use stream::StreamWatcher;
pub use view::{DashboardView, TerminalView};
