//! Single-writer holder of the current dashboard snapshot.
//!
//! Only [`SnapshotStore::refresh`] replaces the value (plus the load at
//! open and the clear at logout); everything else reads.

use std::cell::{Cell, RefCell};

use tracing::{debug, warn};

use super::{DashboardSnapshot, SnapshotPersistence};
use crate::backend::GamificationBackend;
use crate::error::BackendError;

pub struct SnapshotStore {
    current: RefCell<Option<DashboardSnapshot>>,
    persistence: Box<dyn SnapshotPersistence>,
    /// Bumped on clear so refreshes started before a logout are dropped.
    generation: Cell<u64>,
}

impl SnapshotStore {
    /// Create the store for a session, seeded from whatever was persisted.
    /// An unreadable persisted copy is discarded rather than fatal.
    pub fn open(persistence: impl SnapshotPersistence + 'static) -> Self {
        let current = match persistence.load() {
            Ok(snapshot) => snapshot.filter(DashboardSnapshot::is_consistent),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable cached snapshot");
                None
            }
        };
        Self {
            current: RefCell::new(current),
            persistence: Box::new(persistence),
            generation: Cell::new(0),
        }
    }

    pub fn current(&self) -> Option<DashboardSnapshot> {
        self.current.borrow().clone()
    }

    pub fn level(&self) -> Option<u32> {
        self.current.borrow().as_ref().map(|s| s.level)
    }

    pub fn total_xp(&self) -> Option<u32> {
        self.current.borrow().as_ref().map(|s| s.total_xp)
    }

    /// Fetch and replace the snapshot wholesale.
    ///
    /// Returns `Ok(None)` when the store was cleared while the request was in
    /// flight; the late response is discarded.
    pub async fn refresh<B: GamificationBackend>(
        &self,
        backend: &B,
    ) -> Result<Option<DashboardSnapshot>, BackendError> {
        let generation = self.generation.get();
        let snapshot = backend.fetch_dashboard().await?;
        if !snapshot.is_consistent() {
            return Err(BackendError::Decode(format!(
                "inconsistent snapshot: level {} with {}/{} xp",
                snapshot.level, snapshot.current_level_xp, snapshot.xp_for_next_level
            )));
        }
        if self.generation.get() != generation {
            debug!("discarding snapshot refresh that finished after logout");
            return Ok(None);
        }

        *self.current.borrow_mut() = Some(snapshot.clone());
        if let Err(e) = self.persistence.save(&snapshot) {
            warn!(error = %e, "failed to persist dashboard snapshot");
        }
        debug!(level = snapshot.level, total_xp = snapshot.total_xp, "snapshot refreshed");
        Ok(Some(snapshot))
    }

    /// Drop the snapshot and its persisted copy (logout).
    pub fn clear(&self) {
        self.generation.set(self.generation.get() + 1);
        *self.current.borrow_mut() = None;
        if let Err(e) = self.persistence.clear() {
            warn!(error = %e, "failed to clear persisted snapshot");
        }
    }
}
