//! # HabitQuest Core Library
//!
//! Client-side engine for a gamified habit tracker: a focus-session clock,
//! optimistic completion of habits and tasks against a remote backend, and
//! a one-slot feedback channel that celebrates the XP earned.
//!
//! ## Architecture
//!
//! - **Clock**: a no-thread state machine; the caller polls it and gets
//!   [`Event`]s back
//! - **Reconcile**: optimistic local updates confirmed or rolled back by the
//!   backend response
//! - **Snapshot**: the authoritative level and XP figures, fetched only from
//!   the backend
//! - **Storage**: TOML configuration, SQLite key/value cache, keyring token
//!
//! Everything runs on a single-threaded async executor. Shared state lives in
//! `Rc`/`RefCell` and no borrow is held across an `.await`.

pub mod backend;
pub mod clock;
pub mod error;
pub mod events;
pub mod feedback;
pub mod model;
pub mod orchestrator;
pub mod reconcile;
pub mod snapshot;
pub mod storage;

pub use backend::{GamificationBackend, HttpBackend};
pub use clock::{FocusCompletion, SessionClock, SessionConfig, SessionPhase};
pub use error::{BackendError, ClockError, ConfigError, CoreError, DatabaseError, ReconcileError};
pub use events::{Event, GamificationEvent, GamificationKind};
pub use feedback::{FeedbackNotification, FeedbackSelector, Flavor};
pub use model::{CompletionState, Difficulty, EntityId, EntityKind, Habit, Subtask, Task, Theme};
pub use orchestrator::{Orchestrator, Outcome};
pub use reconcile::ActionReconciler;
pub use snapshot::{DashboardSnapshot, KvSnapshotPersistence, SnapshotStore};
pub use storage::{Config, Database};
