//! Where the last known snapshot lives between runs.

use std::cell::RefCell;

use super::DashboardSnapshot;
use crate::error::DatabaseError;
use crate::storage::Database;

const SNAPSHOT_KEY: &str = "dashboard_snapshot";

/// Key-value persistence surface for [`super::SnapshotStore`].
pub trait SnapshotPersistence {
    fn load(&self) -> Result<Option<DashboardSnapshot>, DatabaseError>;
    fn save(&self, snapshot: &DashboardSnapshot) -> Result<(), DatabaseError>;
    fn clear(&self) -> Result<(), DatabaseError>;
}

/// Snapshot stored as JSON in the SQLite kv table.
pub struct KvSnapshotPersistence {
    db: Database,
}

impl KvSnapshotPersistence {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SnapshotPersistence for KvSnapshotPersistence {
    fn load(&self) -> Result<Option<DashboardSnapshot>, DatabaseError> {
        let Some(json) = self.db.kv_get(SNAPSHOT_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| DatabaseError::CorruptValue {
                key: SNAPSHOT_KEY.to_string(),
                message: e.to_string(),
            })
    }

    fn save(&self, snapshot: &DashboardSnapshot) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(snapshot).map_err(|e| DatabaseError::CorruptValue {
            key: SNAPSHOT_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.db.kv_set(SNAPSHOT_KEY, &json)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        self.db.kv_delete(SNAPSHOT_KEY)
    }
}

/// Process-local persistence, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySnapshotPersistence {
    slot: RefCell<Option<DashboardSnapshot>>,
}

impl MemorySnapshotPersistence {
    pub fn with(snapshot: DashboardSnapshot) -> Self {
        Self {
            slot: RefCell::new(Some(snapshot)),
        }
    }

    pub fn stored(&self) -> Option<DashboardSnapshot> {
        self.slot.borrow().clone()
    }
}

impl SnapshotPersistence for MemorySnapshotPersistence {
    fn load(&self) -> Result<Option<DashboardSnapshot>, DatabaseError> {
        Ok(self.slot.borrow().clone())
    }

    fn save(&self, snapshot: &DashboardSnapshot) -> Result<(), DatabaseError> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

impl<P: SnapshotPersistence + ?Sized> SnapshotPersistence for std::rc::Rc<P> {
    fn load(&self) -> Result<Option<DashboardSnapshot>, DatabaseError> {
        (**self).load()
    }

    fn save(&self, snapshot: &DashboardSnapshot) -> Result<(), DatabaseError> {
        (**self).save(snapshot)
    }

    fn clear(&self) -> Result<(), DatabaseError> {
        (**self).clear()
    }
}
