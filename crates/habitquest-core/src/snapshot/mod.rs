mod persistence;
mod store;

pub use persistence::{KvSnapshotPersistence, MemorySnapshotPersistence, SnapshotPersistence};
pub use store::SnapshotStore;

use serde::{Deserialize, Serialize};

/// Latest known gamification state, as returned by `GET dashboard/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub level: u32,
    pub current_level_xp: u32,
    pub xp_for_next_level: u32,
    pub total_xp: u32,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub motivation: Option<String>,
}

impl DashboardSnapshot {
    /// Level >= 1 and progress strictly below the next threshold.
    pub fn is_consistent(&self) -> bool {
        self.level >= 1 && self.current_level_xp < self.xp_for_next_level
    }

    /// 0.0 .. 100.0 progress toward the next level.
    pub fn progress_pct(&self) -> f64 {
        if self.xp_for_next_level == 0 {
            return 0.0;
        }
        (f64::from(self.current_level_xp) / f64::from(self.xp_for_next_level) * 100.0).min(100.0)
    }
}
