//! `parkwatch-store` – The Occupancy Mailbox
//!
//! A single-slot, last-writer-wins store for the latest [`OccupancyState`]
//! reported by the sensor device.
//!
//! The slot lives inside a [`tokio::sync::watch`] channel: a write swaps the
//! whole [`Reading`] under the channel's lock in one step, and readers always
//! receive an owned copy.  A reader can therefore never observe a space count
//! paired with the wrong movement label.
//!
//! # Example
//!
//! ```
//! use parkwatch_store::StateStore;
//!
//! let store = StateStore::new();
//! assert_eq!(store.read().available_spaces, 0);
//!
//! store.write("entrada", 5);
//! let snapshot = store.read();
//! assert_eq!(snapshot.last_movement.as_deref(), Some("entrada"));
//! assert_eq!(snapshot.available_spaces, 5);
//! ```

use parkwatch_types::OccupancyState;
use tokio::sync::watch;
use tracing::debug;

/// A snapshot of the store together with the revision that produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reading {
    pub state: OccupancyState,
    /// Number of writes applied since the store was created (0 = defaults).
    pub revision: u64,
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Process-wide holder of the latest occupancy.
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct StateStore {
    slot: watch::Sender<Reading>,
}

impl StateStore {
    /// Create a store holding the default state (no movement, zero spaces).
    pub fn new() -> Self {
        let (slot, _) = watch::channel(Reading::default());
        Self { slot }
    }

    /// Replace both fields with a new authoritative pair.
    ///
    /// Returns the revision assigned to this write.
    pub fn write(&self, movement: impl Into<String>, spaces: u32) -> u64 {
        self.replace(OccupancyState::new(movement, spaces))
    }

    /// Replace the stored state wholesale.
    ///
    /// Returns the revision assigned to this write.
    pub fn replace(&self, state: OccupancyState) -> u64 {
        let mut revision = 0;
        self.slot.send_modify(|reading| {
            revision = reading.revision + 1;
            *reading = Reading { state, revision };
        });
        debug!(revision, "occupancy state replaced");
        revision
    }

    /// Owned copy of the current state.
    pub fn read(&self) -> OccupancyState {
        self.slot.borrow().state.clone()
    }

    /// Owned copy of the current state plus its revision.
    pub fn reading(&self) -> Reading {
        self.slot.borrow().clone()
    }

    /// Revision of the current state (number of accepted writes).
    pub fn revision(&self) -> u64 {
        self.slot.borrow().revision
    }

    /// Subscribe to future writes.
    ///
    /// The subscriber starts out with the current reading marked as unseen,
    /// so the first [`StateSubscriber::next`] call returns immediately.
    pub fn subscribe(&self) -> StateSubscriber {
        let mut receiver = self.slot.subscribe();
        receiver.mark_changed();
        StateSubscriber { receiver }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// StateSubscriber
// ---------------------------------------------------------------------------

/// Receiver side of [`StateStore::subscribe`].
///
/// Intermediate writes are coalesced: a slow subscriber only ever sees the
/// most recent reading, never a stale queue of them.
pub struct StateSubscriber {
    receiver: watch::Receiver<Reading>,
}

impl StateSubscriber {
    /// Wait for the next unseen reading.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Reading> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
