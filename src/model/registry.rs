//! Hot-swappable reference to the active model snapshot.

use super::snapshot::ModelSnapshot;
use std::sync::{Arc, RwLock};

/// Holds the currently active snapshot.
///
/// Readers clone the `Arc` under a read lock held only for the clone
/// itself, never across a query, so in-flight queries keep observing a
/// single self-consistent snapshot while `swap` publishes a new one.
/// A failed rebuild simply never calls `swap`; the old snapshot stays
/// fully serviceable.
pub struct ModelRegistry {
    active: RwLock<Arc<ModelSnapshot>>,
}

impl ModelRegistry {
    pub fn new(snapshot: Arc<ModelSnapshot>) -> Self {
        ModelRegistry {
            active: RwLock::new(snapshot),
        }
    }

    /// The active snapshot. The returned Arc pins the snapshot for the
    /// caller's whole query even if a swap happens meanwhile.
    pub fn current(&self) -> Arc<ModelSnapshot> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Atomically replace the active snapshot.
    pub fn swap(&self, snapshot: Arc<ModelSnapshot>) {
        *self.active.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
    }
}
