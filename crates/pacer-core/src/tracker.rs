//! Keyed store of per-key attempt bookkeeping.
//!
//! The tracker is a pure state store: no scheduling decisions live here. It is
//! injected into the controller at construction, so independent controllers
//! (e.g. in tests) never share history.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};

use tokio::sync::Mutex as AsyncMutex;

/// Record of the last known attempt for a staggering key.
///
/// Its absence means "no in-flight or recent history for this key": a fresh
/// key incurs zero staggering delay.
#[derive(Debug, Clone, Copy)]
pub struct TrackerEntry {
    attempt: u32,
    recorded_at: SystemTime,
}

impl TrackerEntry {
    /// Attempt count recorded for the key.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Wall-clock time the entry was recorded.
    pub fn recorded_at(&self) -> SystemTime {
        self.recorded_at
    }
}

struct KeySlot {
    gate: Arc<AsyncMutex<()>>,
    entry: Option<TrackerEntry>,
}

/// In-memory store of per-key request history.
///
/// Holds, per key, the most recent attempt context plus the per-key gate the
/// controller uses as a critical section. Keys never share a gate, so
/// unrelated keys never block each other. The interior lock guards only map
/// operations and is never held across awaits.
#[derive(Default)]
pub struct KeyedRequestTracker {
    keys: Mutex<HashMap<String, KeySlot>>,
}

impl KeyedRequestTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-key gate; all controller calls for one key serialize on it.
    ///
    /// Creates the key's slot when absent.
    pub fn gate(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut keys = self.keys.lock().expect("tracker mutex poisoned");
        let slot = keys.entry(key.to_string()).or_insert_with(|| KeySlot {
            gate: Arc::new(AsyncMutex::new(())),
            entry: None,
        });
        Arc::clone(&slot.gate)
    }

    /// Last recorded entry for the key, if any.
    pub fn get(&self, key: &str) -> Option<TrackerEntry> {
        let keys = self.keys.lock().expect("tracker mutex poisoned");
        keys.get(key).and_then(|slot| slot.entry)
    }

    /// Upsert the entry for a key, stamping the current wall-clock time.
    ///
    /// Overwrites any prior entry: at most one entry exists per key.
    pub fn record(&self, key: &str, attempt: u32) {
        let mut keys = self.keys.lock().expect("tracker mutex poisoned");
        let slot = keys.entry(key.to_string()).or_insert_with(|| KeySlot {
            gate: Arc::new(AsyncMutex::new(())),
            entry: None,
        });
        slot.entry = Some(TrackerEntry {
            attempt,
            recorded_at: SystemTime::now(),
        });
    }

    /// Remove a key's entry. Idempotent: removing an absent key is a no-op.
    ///
    /// The whole slot is dropped once no controller call holds its gate, so
    /// the map never accumulates history for finished keys.
    pub fn remove(&self, key: &str) {
        let mut keys = self.keys.lock().expect("tracker mutex poisoned");
        if let Some(slot) = keys.get_mut(key) {
            slot.entry = None;
            if Arc::strong_count(&slot.gate) == 1 {
                keys.remove(key);
            }
        }
    }

    /// Drop a key's slot when it holds neither an entry nor waiting gates.
    ///
    /// Called by the controller after its gate handle is gone; direct users
    /// only need it if they hand out gates themselves. Idempotent.
    pub fn release(&self, key: &str) {
        let mut keys = self.keys.lock().expect("tracker mutex poisoned");
        if let Some(slot) = keys.get(key)
            && slot.entry.is_none()
            && Arc::strong_count(&slot.gate) == 1
        {
            keys.remove(key);
        }
    }

    /// Number of keys with a recorded entry.
    pub fn len(&self) -> usize {
        let keys = self.keys.lock().expect("tracker mutex poisoned");
        keys.values().filter(|slot| slot.entry.is_some()).count()
    }

    /// Returns `true` if no key has a recorded entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
