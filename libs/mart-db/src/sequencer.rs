//! Per-key serialization of read-modify-write sequences.
//!
//! Callers that mutate rows owned by one logical key (for example a user's
//! cart) acquire the key first; concurrent holders of the same key queue up
//! while distinct keys proceed in parallel. Slots are dropped once the last
//! holder or waiter releases them.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct KeySequencer {
    slots: DashMap<String, Arc<Mutex<()>>>,
}

impl KeySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `key` is free and hold it until the guard is dropped.
    pub async fn acquire(&self, key: impl Into<String>) -> SequencerGuard<'_> {
        let key = key.into();
        let slot = self.slots.entry(key.clone()).or_default().clone();
        let guard = slot.lock_owned().await;
        tracing::trace!(key = %key, "sequencer slot acquired");
        SequencerGuard {
            owner: self,
            key,
            guard: Some(guard),
        }
    }

    /// Number of keys currently held or awaited.
    pub fn active_keys(&self) -> usize {
        self.slots.len()
    }
}

pub struct SequencerGuard<'a> {
    owner: &'a KeySequencer,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SequencerGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for SequencerGuard<'_> {
    fn drop(&mut self) {
        // Release the lock first so the strong count reflects only waiters.
        drop(self.guard.take());
        self.owner
            .slots
            .remove_if(&self.key, |_, slot| Arc::strong_count(slot) == 1);
    }
}
