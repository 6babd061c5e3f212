//! [`LotSimulator`] – synthetic entry/exit events for a fixed-capacity lot.
//!
//! Every step is either an [`ENTRY`] (one space taken) or an [`EXIT`] (one
//! space freed).  A full lot can only see exits and an empty lot only entries,
//! so the free-space count stays within `0..=capacity`.  Each step yields the
//! full snapshot to report, never a delta.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use parkwatch_types::ParkError;
use tracing::warn;

use crate::client::SensorClient;

/// Movement label for a car entering the lot.
pub const ENTRY: &str = "entrada";

/// Movement label for a car leaving the lot.
pub const EXIT: &str = "salida";

pub struct LotSimulator<R: Rng = StdRng> {
    capacity: u32,
    free: u32,
    rng: R,
}

impl LotSimulator<StdRng> {
    /// An empty lot of `capacity` spaces with an entropy-seeded RNG.
    pub fn new(capacity: u32) -> Self {
        Self::with_rng(capacity, StdRng::from_entropy())
    }

    /// Deterministic simulator for reproducible runs.
    pub fn seeded(capacity: u32, seed: u64) -> Self {
        Self::with_rng(capacity, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LotSimulator<R> {
    pub fn with_rng(capacity: u32, rng: R) -> Self {
        Self {
            capacity,
            free: capacity,
            rng,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Spaces currently free.
    pub fn free(&self) -> u32 {
        self.free
    }

    /// Advance by one movement and return `(label, free spaces after it)`.
    ///
    /// A lot with zero capacity never changes and keeps reporting exits.
    pub fn step(&mut self) -> (&'static str, u32) {
        let entry = if self.free == 0 {
            false
        } else if self.free >= self.capacity {
            true
        } else {
            self.rng.gen_bool(0.5)
        };

        if entry {
            self.free -= 1;
            (ENTRY, self.free)
        } else {
            self.free = (self.free + 1).min(self.capacity);
            (EXIT, self.free)
        }
    }

    /// Report one step every `interval` through `client`.
    ///
    /// Runs `steps` times, or forever when `steps` is `None`.  A failed report
    /// is logged and the next step is still attempted.  Returns the number of
    /// reports the server accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ParkError::Config`] if `interval` is zero.
    pub async fn drive(
        &mut self,
        client: &SensorClient,
        interval: Duration,
        steps: Option<u64>,
    ) -> Result<u64, ParkError> {
        if interval.is_zero() {
            return Err(ParkError::Config("report interval must be greater than zero".into()));
        }
        let mut ticker = tokio::time::interval(interval);
        let mut accepted = 0;
        let mut taken = 0;

        while steps.is_none_or(|limit| taken < limit) {
            ticker.tick().await;
            let (movement, spaces) = self.step();
            taken += 1;
            match client.report(movement, spaces).await {
                Ok(()) => accepted += 1,
                Err(e) => warn!(movement, spaces, error = %e, "simulated report failed"),
            }
        }
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parkwatch_server::router;
    use parkwatch_store::StateStore;
    use parkwatch_types::OccupancyState;
    use tokio::net::TcpListener;

    #[test]
    fn empty_lot_starts_with_an_entry() {
        let mut sim = LotSimulator::seeded(5, 1);
        assert_eq!(sim.step(), (ENTRY, 4));
    }

    #[test]
    fn full_lot_only_sees_exits() {
        let mut sim = LotSimulator::seeded(1, 7);
        assert_eq!(sim.step(), (ENTRY, 0));
        assert_eq!(sim.step(), (EXIT, 1));
    }

    #[test]
    fn free_spaces_stay_within_capacity() {
        let mut sim = LotSimulator::seeded(3, 42);
        for _ in 0..1000 {
            let (movement, free) = sim.step();
            assert!(free <= 3);
            assert!(movement == ENTRY || movement == EXIT);
            assert_eq!(free, sim.free());
        }
    }

    #[test]
    fn each_step_changes_the_count_by_one() {
        let mut sim = LotSimulator::seeded(10, 3);
        let mut previous = sim.free();
        for _ in 0..200 {
            let (movement, free) = sim.step();
            match movement {
                ENTRY => assert_eq!(free + 1, previous),
                _ => assert_eq!(free, previous + 1),
            }
            previous = free;
        }
    }

    #[test]
    fn zero_capacity_lot_is_stable() {
        let mut sim = LotSimulator::seeded(0, 9);
        assert_eq!(sim.step(), (EXIT, 0));
        assert_eq!(sim.step(), (EXIT, 0));
    }

    #[tokio::test]
    async fn drive_reports_each_step_to_the_server() {
        let store = Arc::new(StateStore::new());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let app = router(Arc::clone(&store));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = SensorClient::new(&base, Duration::from_secs(2)).unwrap();
        let mut sim = LotSimulator::seeded(4, 11);
        let accepted = sim
            .drive(&client, Duration::from_millis(10), Some(3))
            .await
            .unwrap();

        assert_eq!(accepted, 3);
        assert_eq!(store.revision(), 3);
        assert_eq!(store.read().available_spaces, sim.free());
        assert_ne!(store.read(), OccupancyState::default());
    }

    #[tokio::test]
    async fn drive_rejects_zero_interval() {
        let client = SensorClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let mut sim = LotSimulator::seeded(4, 11);
        let err = sim.drive(&client, Duration::ZERO, Some(1)).await.unwrap_err();

        assert!(matches!(err, ParkError::Config(_)));
        assert_eq!(sim.free(), 4);
    }
}
