//! Optimistic completion of habits, tasks and subtasks.
//!
//! Every completion follows the same command shape:
//!
//! ```text
//! capture prior -> apply locally -> confirm remotely -> merge | restore
//! ```
//!
//! A confirmed habit/task completion then refreshes the [`SnapshotStore`]
//! and diffs it against the level seen before the request to derive a
//! [`GamificationEvent`].

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::cache::{Confirmation, EntityCache};
use crate::backend::GamificationBackend;
use crate::error::{BackendError, ReconcileError};
use crate::events::{GamificationEvent, GamificationKind};
use crate::model::{EntityId, EntityKind, Habit, Task};
use crate::snapshot::SnapshotStore;

type InFlightKey = (EntityKind, EntityId);

/// Marks one entity as awaiting confirmation for as long as it lives, so the
/// marker is released on every exit path, including a dropped future.
struct InFlightGuard<'a> {
    set: &'a RefCell<HashSet<InFlightKey>>,
    key: InFlightKey,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(
        set: &'a RefCell<HashSet<InFlightKey>>,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<Self, ReconcileError> {
        if !set.borrow_mut().insert((kind, id)) {
            return Err(ReconcileError::AlreadyInProgress { kind, id });
        }
        Ok(Self {
            set,
            key: (kind, id),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.borrow_mut().remove(&self.key);
    }
}

pub struct ActionReconciler<B: GamificationBackend> {
    backend: Rc<B>,
    snapshots: Rc<SnapshotStore>,
    cache: RefCell<EntityCache>,
    in_flight: RefCell<HashSet<InFlightKey>>,
}

impl<B: GamificationBackend> ActionReconciler<B> {
    pub fn new(backend: Rc<B>, snapshots: Rc<SnapshotStore>) -> Self {
        Self {
            backend,
            snapshots,
            cache: RefCell::new(EntityCache::default()),
            in_flight: RefCell::new(HashSet::new()),
        }
    }

    // ── Cache access ─────────────────────────────────────────────────

    pub fn cache(&self) -> Ref<'_, EntityCache> {
        self.cache.borrow()
    }

    pub fn habit(&self, id: EntityId) -> Option<Habit> {
        self.cache.borrow().habit(id).cloned()
    }

    pub fn task(&self, id: EntityId) -> Option<Task> {
        self.cache.borrow().task(id).cloned()
    }

    pub fn is_in_flight(&self, kind: EntityKind, id: EntityId) -> bool {
        self.in_flight.borrow().contains(&(kind, id))
    }

    pub fn replace_habits(&self, habits: Vec<Habit>) {
        self.cache.borrow_mut().replace_habits(habits);
    }

    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        self.cache.borrow_mut().replace_tasks(tasks);
    }

    /// Local deletion. A completion still in flight for this habit will be
    /// discarded when its response arrives.
    pub fn remove_habit(&self, id: EntityId) -> Option<Habit> {
        self.cache.borrow_mut().remove_habit(id)
    }

    pub fn remove_task(&self, id: EntityId) -> Option<Task> {
        self.cache.borrow_mut().remove_task(id)
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Reload habits and tasks from the backend.
    pub async fn load_entities(&self) -> Result<(), BackendError> {
        let habits = self.backend.fetch_habits().await?;
        let tasks = self.backend.fetch_tasks().await?;
        let mut cache = self.cache.borrow_mut();
        cache.replace_habits(habits);
        cache.replace_tasks(tasks);
        Ok(())
    }

    // ── Completions ──────────────────────────────────────────────────

    pub async fn complete_habit(
        &self,
        id: EntityId,
    ) -> Result<Option<GamificationEvent>, ReconcileError> {
        self.complete(id, EntityKind::Habit).await
    }

    pub async fn complete_task(
        &self,
        id: EntityId,
    ) -> Result<Option<GamificationEvent>, ReconcileError> {
        self.complete(id, EntityKind::Task).await
    }

    /// Complete a habit or task.
    ///
    /// `Ok(None)` means nothing to celebrate: the entity was already
    /// completed, or neither the response nor a snapshot refresh told us how
    /// much XP was earned. A pending subtask is toggled to done, a done one is
    /// left alone, and neither produces an event.
    pub async fn complete(
        &self,
        id: EntityId,
        kind: EntityKind,
    ) -> Result<Option<GamificationEvent>, ReconcileError> {
        if kind == EntityKind::Subtask {
            let (_, state) = self
                .cache
                .borrow()
                .find_subtask(id)
                .ok_or(ReconcileError::UnknownEntity { kind, id })?;
            if state.is_completed() {
                debug!(%kind, id, "already completed; nothing to do");
            } else {
                self.toggle_subtask(id).await?;
            }
            return Ok(None);
        }

        let _guard = InFlightGuard::acquire(&self.in_flight, kind, id)?;

        let prior = self
            .cache
            .borrow()
            .prior(kind, id)
            .ok_or(ReconcileError::UnknownEntity { kind, id })?;
        if prior.is_completed() {
            debug!(%kind, id, "already completed; nothing to do");
            return Ok(None);
        }
        let theme = prior.theme();

        self.cache.borrow_mut().mark_completed(kind, id);
        let old_level = self.snapshots.level();
        let old_total_xp = self.snapshots.total_xp();
        debug!(%kind, id, ?old_level, "applied optimistic completion");

        let confirmation = match kind {
            EntityKind::Habit => self.backend.complete_habit(id).await.map(Confirmation::Habit),
            _ => self.backend.complete_task(id).await.map(Confirmation::Task),
        };
        let confirmation = match confirmation {
            Ok(c) => c,
            Err(source) => {
                if !self.cache.borrow_mut().restore(prior) {
                    debug!(%kind, id, "entity removed while failing; discarding");
                    return Err(ReconcileError::StaleEntity { kind, id });
                }
                warn!(%kind, id, error = %source, "completion rejected; rolled back");
                return Err(ReconcileError::CompletionFailed { kind, id, source });
            }
        };

        if !self.cache.borrow_mut().merge(id, &confirmation) {
            debug!(%kind, id, "entity removed before confirmation; discarding");
            return Err(ReconcileError::StaleEntity { kind, id });
        }

        let refreshed = match self.snapshots.refresh(self.backend.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "snapshot refresh failed after completion");
                None
            }
        };

        let xp_awarded = confirmation.xp_awarded().or_else(|| {
            let new_total = refreshed.as_ref()?.total_xp;
            Some(new_total.saturating_sub(old_total_xp?))
        });
        let Some(xp_awarded) = xp_awarded else {
            debug!(%kind, id, "completion confirmed but xp unknown; no event");
            return Ok(None);
        };

        let event = GamificationEvent::derive(
            gamification_kind(kind),
            theme,
            xp_awarded,
            old_level,
            refreshed.map(|s| s.level),
        );
        info!(%kind, id, xp = event.xp_awarded, leveled_up = event.leveled_up, "completion confirmed");
        Ok(Some(event))
    }

    /// Flip a subtask, confirm, and restore on failure. Returns the
    /// confirmed completion flag. Never touches the parent task's state.
    pub async fn toggle_subtask(&self, subtask_id: EntityId) -> Result<bool, ReconcileError> {
        let kind = EntityKind::Subtask;
        let (task_id, prior_state) = self
            .cache
            .borrow()
            .find_subtask(subtask_id)
            .ok_or(ReconcileError::UnknownEntity { kind, id: subtask_id })?;
        let _guard = InFlightGuard::acquire(&self.in_flight, kind, subtask_id)?;

        let flipped = (!prior_state.is_completed()).into();
        self.cache
            .borrow_mut()
            .set_subtask_state(task_id, subtask_id, flipped);

        match self.backend.toggle_subtask(subtask_id).await {
            Ok(resp) => {
                let confirmed = resp.is_completed.into();
                if !self
                    .cache
                    .borrow_mut()
                    .set_subtask_state(task_id, subtask_id, confirmed)
                {
                    return Err(ReconcileError::StaleEntity { kind, id: subtask_id });
                }
                Ok(resp.is_completed)
            }
            Err(source) => {
                if !self
                    .cache
                    .borrow_mut()
                    .set_subtask_state(task_id, subtask_id, prior_state)
                {
                    return Err(ReconcileError::StaleEntity { kind, id: subtask_id });
                }
                warn!(subtask_id, error = %source, "subtask toggle rejected; rolled back");
                Err(ReconcileError::CompletionFailed {
                    kind,
                    id: subtask_id,
                    source,
                })
            }
        }
    }
}

fn gamification_kind(kind: EntityKind) -> GamificationKind {
    match kind {
        EntityKind::Task => GamificationKind::TaskCompleted,
        _ => GamificationKind::HabitCompleted,
    }
}
