//! Keyed, time-bounded table of tracked aircraft.
//!
//! Records are created on the first message for an address and dropped once
//! they go quiet for longer than the configured timeout. Eviction is pulled,
//! not pushed: it only happens inside [`AircraftStore::aircrafts`].

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::aircraft::Aircraft;
use crate::config::StoreConfig;
use crate::message::Message;
use crate::types::{icao_to_string, now_millis, Icao};

/// Live aircraft table.
///
/// Single owner: both `add_message` and `aircrafts` take `&mut self`, so a
/// concurrent embedding wraps the whole store in one lock.
#[derive(Debug, Default)]
pub struct AircraftStore {
    config: StoreConfig,
    index: HashMap<Icao, Aircraft>,
}

impl AircraftStore {
    pub fn new(config: StoreConfig) -> Self {
        AircraftStore {
            config: config.normalized(),
            index: HashMap::new(),
        }
    }

    /// Inactivity threshold in milliseconds.
    pub fn timeout(&self) -> u64 {
        self.config.timeout
    }

    /// Route a message to its aircraft, creating the record if needed.
    ///
    /// `reception_time` defaults to the wall clock.
    pub fn add_message(&mut self, msg: &Message, reception_time: Option<u64>) {
        let reception_time = reception_time.unwrap_or_else(now_millis);
        let aircraft = self.index.entry(msg.icao).or_insert_with(|| {
            trace!(icao = %icao_to_string(msg.icao), "new aircraft");
            Aircraft::new()
        });
        aircraft.update(msg, reception_time);
    }

    /// Evict stale aircraft, then return the ones still live.
    ///
    /// `current_time` defaults to the wall clock. Order is unspecified.
    pub fn aircrafts(&mut self, current_time: Option<u64>) -> Vec<&Aircraft> {
        let current_time = current_time.unwrap_or_else(now_millis);
        self.prune(current_time);
        self.index.values().collect()
    }

    /// Look up a record without evicting anything.
    pub fn get(&self, icao: Icao) -> Option<&Aircraft> {
        self.index.get(&icao)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn prune(&mut self, current_time: u64) {
        let timeout = self.config.timeout;
        let before = self.index.len();
        self.index.retain(|_, ac| !ac.is_stale(current_time, timeout));
        let evicted = before - self.index.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.index.len(), "pruned stale aircraft");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
