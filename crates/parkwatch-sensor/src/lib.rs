//! `parkwatch-sensor` – The Device Side
//!
//! - [`client`] – [`SensorClient`]: posts occupancy reports to
//!   `POST /api/movimiento`, the way the embedded device does.
//! - [`simulator`] – [`LotSimulator`]: a stand-in for the physical sensor
//!   that produces plausible entry/exit events for a lot of fixed capacity.

pub mod client;
pub mod simulator;

pub use client::SensorClient;
pub use simulator::{ENTRY, EXIT, LotSimulator};
