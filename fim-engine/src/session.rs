//! Last-write-wins bookkeeping for recomputations triggered by parameter changes.
//!
//! Each change event takes a [`Generation`] ticket before recomputing. A result
//! is kept only if no newer ticket has been issued in the meantime; anything
//! older is dropped. There is no queue and no cancellation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Ticket identifying one parameter-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// Holds the most recent accepted result.
#[derive(Debug)]
pub struct RecomputeSession<T> {
    issued: AtomicU64,
    latest: Mutex<Slot<T>>,
}

impl<T> Default for RecomputeSession<T> {
    fn default() -> Self {
        RecomputeSession::new()
    }
}

impl<T> RecomputeSession<T> {
    pub fn new() -> RecomputeSession<T> {
        RecomputeSession {
            issued: AtomicU64::new(0),
            latest: Mutex::new(Slot {
                generation: 0,
                value: None,
            }),
        }
    }

    /// Register a parameter change. Every earlier ticket becomes stale.
    pub fn begin(&self) -> Generation {
        Generation(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.issued.load(Ordering::SeqCst) == generation.0
    }

    /// Offer a finished result. Returns whether it was kept.
    pub fn publish(&self, generation: Generation, value: T) -> bool {
        let mut slot = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if !self.is_current(generation) || generation.0 <= slot.generation {
            log::debug!(
                "[FIM] session: dropped superseded result {} (latest issued {})",
                generation.0,
                self.issued.load(Ordering::SeqCst)
            );
            return false;
        }
        slot.generation = generation.0;
        slot.value = Some(value);
        true
    }

    /// Generation of the last accepted result, if any.
    pub fn latest_generation(&self) -> Option<Generation> {
        let slot = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        slot.value.as_ref().map(|_| Generation(slot.generation))
    }

    /// Take the last accepted result, leaving the session empty.
    pub fn take(&self) -> Option<T> {
        let mut slot = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        slot.value.take()
    }
}

impl<T: Clone> RecomputeSession<T> {
    /// Clone of the last accepted result.
    pub fn latest(&self) -> Option<T> {
        let slot = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        slot.value.clone()
    }
}
