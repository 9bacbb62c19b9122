//! Wiring between the focus clock, the reconciler and the feedback slot.
//!
//! Data flows one way: user action -> reconciler or clock ->
//! [`GamificationEvent`] -> [`FeedbackSelector`] -> view.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::GamificationBackend;
use crate::clock::{FocusCompletion, SystemTimeSource, TimeSource};
use crate::error::{BackendError, ReconcileError};
use crate::events::{Event, GamificationEvent, GamificationKind};
use crate::feedback::{FeedbackNotification, FeedbackSelector};
use crate::model::{EntityId, EntityKind};
use crate::reconcile::ActionReconciler;
use crate::snapshot::{DashboardSnapshot, SnapshotStore};

/// What the view should do after a user action settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Confirmed and celebrated.
    Rewarded {
        event: GamificationEvent,
        notification: FeedbackNotification,
    },
    /// Confirmed (or already done) with nothing to celebrate.
    Quiet,
    /// The same entity is still awaiting confirmation; keep it pending.
    StillPending,
    /// The response belonged to an entity removed in the meantime.
    Discarded,
}

pub struct Orchestrator<B: GamificationBackend, T: TimeSource = SystemTimeSource> {
    backend: Rc<B>,
    snapshots: Rc<SnapshotStore>,
    reconciler: ActionReconciler<B>,
    feedback: RefCell<FeedbackSelector<T>>,
}

impl<B: GamificationBackend, T: TimeSource> Orchestrator<B, T> {
    pub fn new(backend: Rc<B>, snapshots: Rc<SnapshotStore>, feedback: FeedbackSelector<T>) -> Self {
        let reconciler = ActionReconciler::new(backend.clone(), snapshots.clone());
        Self {
            backend,
            snapshots,
            reconciler,
            feedback: RefCell::new(feedback),
        }
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn reconciler(&self) -> &ActionReconciler<B> {
        &self.reconciler
    }

    /// Refresh the snapshot and the entity caches.
    ///
    /// A failed dashboard refresh keeps the cached snapshot and is only
    /// logged; failing to fetch the entity lists is an error.
    pub async fn load(&self) -> Result<(), BackendError> {
        if let Err(e) = self.refresh_dashboard().await {
            warn!(error = %e, "dashboard refresh failed; keeping cached snapshot");
        }
        self.reconciler.load_entities().await
    }

    pub async fn refresh_dashboard(&self) -> Result<Option<DashboardSnapshot>, BackendError> {
        self.snapshots.refresh(self.backend.as_ref()).await
    }

    pub async fn complete(&self, id: EntityId, kind: EntityKind) -> Result<Outcome, ReconcileError> {
        match self.reconciler.complete(id, kind).await {
            Ok(Some(event)) => Ok(self.celebrate(event)),
            Ok(None) => Ok(Outcome::Quiet),
            Err(e) => settle(e),
        }
    }

    /// Toggle a subtask. `None` means the toggle settled silently (still
    /// pending, or the parent task vanished).
    pub async fn toggle_subtask(&self, id: EntityId) -> Result<Option<Event>, ReconcileError> {
        let task_id = self.reconciler.cache().find_subtask(id).map(|(task_id, _)| task_id);
        match self.reconciler.toggle_subtask(id).await {
            Ok(completed) => Ok(task_id.map(|task_id| Event::SubtaskToggled {
                task_id,
                subtask_id: id,
                completed,
                at: Utc::now(),
            })),
            Err(e) => settle(e).map(|_| None),
        }
    }

    /// React to clock output; only a finished session does anything.
    pub async fn handle_clock_events(&self, events: &[Event]) -> Option<Outcome> {
        let completion = events.iter().find_map(|e| match e {
            Event::SessionFinished { completion, .. } => Some(*completion),
            _ => None,
        })?;
        Some(self.finish_focus(completion).await)
    }

    /// Record a finished session and celebrate the XP it earned.
    ///
    /// The save is fire-and-forget from the user's point of view: a failure
    /// is logged and simply yields no celebration. A saved session is always
    /// celebrated; when either side of the XP delta is unknown it counts as
    /// zero XP and never as a level-up.
    pub async fn finish_focus(&self, completion: FocusCompletion) -> Outcome {
        let old_level = self.snapshots.level();
        let old_total_xp = self.snapshots.total_xp();

        if let Err(e) = self.backend.record_focus_session(&completion).await {
            warn!(error = %e, ?completion, "failed to record focus session");
            return Outcome::Quiet;
        }

        let refreshed = match self.snapshots.refresh(self.backend.as_ref()).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "snapshot refresh failed after focus session");
                None
            }
        };
        let (xp, new_level) = match (refreshed, old_total_xp) {
            (Some(after), Some(before)) => (after.total_xp.saturating_sub(before), Some(after.level)),
            _ => {
                debug!("focus xp unknown; celebrating without a delta");
                (0, None)
            }
        };

        let event = GamificationEvent::derive(
            GamificationKind::FocusCompleted,
            None,
            xp,
            old_level,
            new_level,
        );
        self.celebrate(event)
    }

    pub fn current_feedback(&self) -> Option<FeedbackNotification> {
        self.feedback.borrow_mut().current().cloned()
    }

    pub fn dismiss_feedback(&self) {
        self.feedback.borrow_mut().dismiss();
    }

    /// Tear down everything tied to the logged-in user.
    pub fn logout(&self) {
        self.snapshots.clear();
        self.reconciler.clear();
        self.feedback.borrow_mut().dismiss();
    }

    fn celebrate(&self, event: GamificationEvent) -> Outcome {
        let notification = self.feedback.borrow_mut().show(&event).clone();
        Outcome::Rewarded {
            event,
            notification,
        }
    }
}

/// Errors the user never sees become outcomes; the rest propagate.
fn settle(err: ReconcileError) -> Result<Outcome, ReconcileError> {
    match err {
        ReconcileError::AlreadyInProgress { .. } => Ok(Outcome::StillPending),
        ReconcileError::StaleEntity { .. } => Ok(Outcome::Discarded),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{self, FakeBackend};
    use crate::backend::HabitCompletion;
    use crate::clock::{
        IntervalScheduler, ManualTimeSource, SessionClock, SessionConfig, SessionPhase,
    };
    use crate::model::{CompletionState, Difficulty, Habit, Theme};
    use crate::snapshot::MemorySnapshotPersistence;

    fn orchestrator(
        backend: FakeBackend,
        before: DashboardSnapshot,
        time: &ManualTimeSource,
    ) -> Orchestrator<FakeBackend, ManualTimeSource> {
        let store = Rc::new(SnapshotStore::open(MemorySnapshotPersistence::with(before)));
        let o = Orchestrator::new(Rc::new(backend), store, FeedbackSelector::new(time.clone()));
        o.reconciler().replace_habits(vec![Habit {
            id: 1,
            title: "Run".into(),
            notes: String::new(),
            difficulty: Difficulty::Hard,
            theme: Some(Theme::Exercise),
            frequency: "daily".into(),
            state: CompletionState::Pending,
            current_streak: 0,
        }]);
        o
    }

    #[tokio::test]
    async fn level_up_beats_theme_in_notification() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend
            .push_habit(Ok(HabitCompletion {
                xp_awarded: Some(40),
                streak: Some(1),
                is_completed: true,
            }))
            .push_dashboard(Ok(fake::snapshot(3, 520)));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);

        let outcome = o.complete(1, EntityKind::Habit).await.unwrap();
        let Outcome::Rewarded { event, notification } = outcome else {
            panic!("expected a reward, got {outcome:?}");
        };
        assert!(event.leveled_up);
        assert_eq!(event.new_level, Some(3));
        assert_eq!(notification.mascot_key, "mascot-level-up");
        assert_eq!(o.current_feedback(), Some(notification));
    }

    #[tokio::test]
    async fn failure_surfaces_and_shows_nothing() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend.push_habit(Err(fake::status(500)));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);

        assert!(matches!(
            o.complete(1, EntityKind::Habit).await,
            Err(ReconcileError::CompletionFailed { .. })
        ));
        assert!(o.current_feedback().is_none());
    }

    #[tokio::test]
    async fn finished_session_is_recorded_and_celebrated() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend.focus.borrow_mut().push_back(Ok(()));
        backend.push_dashboard(Ok(fake::snapshot(2, 530)));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);

        let mut clock = SessionClock::new(IntervalScheduler::new(time.clone()));
        clock.configure(SessionConfig::new(1500, 0, 2)).unwrap();
        clock.start().unwrap();
        time.advance(3000 * 1000);
        let events = clock.poll();
        assert_eq!(clock.phase(), SessionPhase::Finished);

        let outcome = o.handle_clock_events(&events).await.unwrap();
        let Outcome::Rewarded { event, notification } = outcome else {
            panic!("expected a reward, got {outcome:?}");
        };
        assert_eq!(event.kind, GamificationKind::FocusCompleted);
        assert_eq!(event.theme, None);
        assert_eq!(event.xp_awarded, 50);
        assert_eq!(notification.mascot_key, "mascot-neutral");
        assert_eq!(o.backend.calls_to("focus:25x2"), 1);
    }

    #[tokio::test]
    async fn cancelled_session_records_nothing() {
        let time = ManualTimeSource::new(0);
        let o = orchestrator(FakeBackend::default(), fake::snapshot(2, 480), &time);

        let mut clock = SessionClock::new(IntervalScheduler::new(time.clone()));
        clock.start().unwrap();
        time.advance(60_000);
        let mut events = clock.poll();
        events.push(clock.cancel().unwrap());

        assert!(o.handle_clock_events(&events).await.is_none());
        assert_eq!(o.backend.calls_to("focus:"), 0);
    }

    #[tokio::test]
    async fn failed_focus_save_is_quiet() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend.focus.borrow_mut().push_back(Err(fake::status(500)));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);

        let outcome = o
            .finish_focus(FocusCompletion {
                duration_minutes: 25,
                sessions_completed: 1,
            })
            .await;
        assert_eq!(outcome, Outcome::Quiet);
        assert_eq!(o.backend.calls_to("dashboard"), 0);
    }

    #[tokio::test]
    async fn focus_without_baseline_is_celebrated_at_zero_xp() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend.focus.borrow_mut().push_back(Ok(()));
        backend.push_dashboard(Ok(fake::snapshot(4, 900)));
        let store = Rc::new(SnapshotStore::open(MemorySnapshotPersistence::default()));
        let o = Orchestrator::new(Rc::new(backend), store, FeedbackSelector::new(time.clone()));

        let outcome = o
            .finish_focus(FocusCompletion {
                duration_minutes: 25,
                sessions_completed: 1,
            })
            .await;
        let Outcome::Rewarded { event, notification } = outcome else {
            panic!("expected a reward, got {outcome:?}");
        };
        assert_eq!(event.kind, GamificationKind::FocusCompleted);
        assert_eq!(event.xp_awarded, 0);
        assert!(!event.leveled_up);
        assert_eq!(notification.mascot_key, "mascot-neutral");
        assert_eq!(notification.message_text, "Nice work!");
        assert_eq!(o.snapshots().level(), Some(4));
    }

    #[tokio::test]
    async fn load_survives_dashboard_failure() {
        let time = ManualTimeSource::new(0);
        let o = orchestrator(FakeBackend::default(), fake::snapshot(2, 480), &time);

        o.load().await.unwrap();
        assert_eq!(o.backend.calls_to("dashboard"), 1);
        assert_eq!(o.backend.calls_to("habits"), 1);
        assert_eq!(o.backend.calls_to("tasks"), 1);
        assert_eq!(o.snapshots().total_xp(), Some(480));
    }

    #[tokio::test]
    async fn logout_clears_session_state() {
        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend
            .push_habit(Ok(HabitCompletion {
                xp_awarded: Some(10),
                streak: None,
                is_completed: true,
            }))
            .push_dashboard(Ok(fake::snapshot(2, 490)));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);
        o.complete(1, EntityKind::Habit).await.unwrap();

        o.logout();
        assert!(o.snapshots().current().is_none());
        assert!(o.reconciler().habit(1).is_none());
        assert!(o.current_feedback().is_none());
    }

    #[tokio::test]
    async fn subtask_toggle_reports_parent_task() {
        use crate::backend::SubtaskToggle;
        use crate::model::{Subtask, Task};

        let time = ManualTimeSource::new(0);
        let backend = FakeBackend::default();
        backend.push_subtask(Ok(SubtaskToggle { is_completed: true }));
        let o = orchestrator(backend, fake::snapshot(2, 480), &time);
        o.reconciler().replace_tasks(vec![Task {
            id: 7,
            title: "Essay".into(),
            notes: String::new(),
            difficulty: Difficulty::Medium,
            theme: Some(Theme::Studies),
            state: CompletionState::Pending,
            subtasks: vec![Subtask {
                id: 70,
                description: "Outline".into(),
                state: CompletionState::Pending,
            }],
        }]);

        let event = o.toggle_subtask(70).await.unwrap().unwrap();
        assert!(matches!(
            event,
            Event::SubtaskToggled {
                task_id: 7,
                subtask_id: 70,
                completed: true,
                ..
            }
        ));
        assert!(o.current_feedback().is_none());
    }
}
