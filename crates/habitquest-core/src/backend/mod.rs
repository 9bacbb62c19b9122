//! Boundary to the REST backend.
//!
//! The backend owns persistence and every XP/level/streak computation.
//! The engine only consumes the response shapes below.

#[cfg(test)]
pub(crate) mod fake;
mod http;

pub use http::HttpBackend;

use serde::{Deserialize, Serialize};

use crate::clock::FocusCompletion;
use crate::error::BackendError;
use crate::model::{EntityId, Habit, Task};
use crate::snapshot::DashboardSnapshot;

fn default_true() -> bool {
    true
}

/// `POST habits/{id}/complete/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompletion {
    #[serde(default)]
    pub xp_awarded: Option<u32>,
    #[serde(default)]
    pub streak: Option<u32>,
    #[serde(default = "default_true")]
    pub is_completed: bool,
}

/// `POST tasks/{id}/complete/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    #[serde(default)]
    pub xp_awarded: Option<u32>,
    #[serde(default = "default_true")]
    pub is_completed: bool,
}

/// `POST subtasks/{id}/toggle/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtaskToggle {
    pub is_completed: bool,
}

/// Operations the engine needs from the backend.
///
/// Futures are awaited on a single logical thread, so implementations
/// need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait GamificationBackend {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, BackendError>;

    async fn fetch_habits(&self) -> Result<Vec<Habit>, BackendError>;

    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError>;

    async fn complete_habit(&self, id: EntityId) -> Result<HabitCompletion, BackendError>;

    async fn complete_task(&self, id: EntityId) -> Result<TaskCompletion, BackendError>;

    async fn toggle_subtask(&self, id: EntityId) -> Result<SubtaskToggle, BackendError>;

    /// Acknowledgment only; the response body is ignored.
    async fn record_focus_session(&self, completion: &FocusCompletion) -> Result<(), BackendError>;
}
