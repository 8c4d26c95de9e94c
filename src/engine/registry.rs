//! Process-wide registry of running progress drivers
//!
//! Each entry owns the sending half of a `watch` channel; the driver task
//! holds the receiver. Dropping an entry closes the channel, which the
//! driver treats as a stop.

use crate::session::SessionId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Control signal delivered to a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverSignal {
    Run,
    Pause,
    Stop,
}

struct DriverEntry {
    signal: watch::Sender<DriverSignal>,
    generation: u64,
}

/// What a freshly registered driver receives
pub struct DriverLease {
    pub signal: watch::Receiver<DriverSignal>,
    pub generation: u64,
}

/// Registry of active drivers keyed by session id
#[derive(Default)]
pub struct DriverRegistry {
    entries: Mutex<HashMap<SessionId, DriverEntry>>,
    generations: AtomicU64,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<SessionId, DriverEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the driver slot for a session; `None` if a driver already holds it
    pub fn register(&self, id: &SessionId) -> Option<DriverLease> {
        let mut entries = self.entries();
        if entries.contains_key(id) {
            return None;
        }

        let (tx, rx) = watch::channel(DriverSignal::Run);
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            id.clone(),
            DriverEntry {
                signal: tx,
                generation,
            },
        );

        Some(DriverLease {
            signal: rx,
            generation,
        })
    }

    /// Deliver a signal; returns false when no driver is registered
    pub fn signal(&self, id: &SessionId, signal: DriverSignal) -> bool {
        match self.entries().get(id) {
            Some(entry) => {
                entry.signal.send_replace(signal);
                true
            }
            None => false,
        }
    }

    /// Stop and forget the driver for a session
    pub fn remove(&self, id: &SessionId) -> bool {
        match self.entries().remove(id) {
            Some(entry) => {
                entry.signal.send_replace(DriverSignal::Stop);
                true
            }
            None => false,
        }
    }

    /// Remove the entry only if it still belongs to the given lease
    pub fn release(&self, id: &SessionId, generation: u64) {
        let mut entries = self.entries();
        if entries.get(id).map(|e| e.generation) == Some(generation) {
            entries.remove(id);
        }
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.entries().contains_key(id)
    }

    pub fn active_count(&self) -> usize {
        self.entries().len()
    }

    /// Stop every driver; returns how many were registered
    pub fn stop_all(&self) -> usize {
        let mut entries = self.entries();
        let count = entries.len();
        for (_, entry) in entries.drain() {
            entry.signal.send_replace(DriverSignal::Stop);
        }
        count
    }
}
