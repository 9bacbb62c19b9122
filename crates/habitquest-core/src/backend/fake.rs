//! Scripted in-process backend for unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tokio::sync::Notify;

use super::{GamificationBackend, HabitCompletion, SubtaskToggle, TaskCompletion};
use crate::clock::FocusCompletion;
use crate::error::BackendError;
use crate::model::{EntityId, Habit, Task};
use crate::snapshot::DashboardSnapshot;

type Scripted<T> = RefCell<VecDeque<Result<T, BackendError>>>;

#[derive(Default)]
pub(crate) struct FakeBackend {
    pub dashboards: Scripted<DashboardSnapshot>,
    pub habits: Scripted<HabitCompletion>,
    pub tasks: Scripted<TaskCompletion>,
    pub subtasks: Scripted<SubtaskToggle>,
    pub focus: Scripted<()>,
    pub calls: RefCell<Vec<String>>,
    /// When set, completion calls wait for a permit before answering.
    pub gate: Option<Rc<Notify>>,
}

pub(crate) fn status(code: u16) -> BackendError {
    BackendError::Status {
        status: code,
        body: String::new(),
    }
}

pub(crate) fn snapshot(level: u32, total_xp: u32) -> DashboardSnapshot {
    DashboardSnapshot {
        level,
        current_level_xp: 10,
        xp_for_next_level: 100,
        total_xp,
        first_name: "Test".into(),
        motivation: None,
    }
}

impl FakeBackend {
    pub fn gated() -> (Self, Rc<Notify>) {
        let gate = Rc::new(Notify::new());
        (
            Self {
                gate: Some(gate.clone()),
                ..Self::default()
            },
            gate,
        )
    }

    pub fn push_dashboard(&self, r: Result<DashboardSnapshot, BackendError>) -> &Self {
        self.dashboards.borrow_mut().push_back(r);
        self
    }

    pub fn push_habit(&self, r: Result<HabitCompletion, BackendError>) -> &Self {
        self.habits.borrow_mut().push_back(r);
        self
    }

    pub fn push_task(&self, r: Result<TaskCompletion, BackendError>) -> &Self {
        self.tasks.borrow_mut().push_back(r);
        self
    }

    pub fn push_subtask(&self, r: Result<SubtaskToggle, BackendError>) -> &Self {
        self.subtasks.borrow_mut().push_back(r);
        self
    }

    pub fn calls_to(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    async fn wait_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
    }

    fn next<T>(queue: &Scripted<T>) -> Result<T, BackendError> {
        queue.borrow_mut().pop_front().unwrap_or_else(|| Err(status(500)))
    }
}

impl GamificationBackend for FakeBackend {
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, BackendError> {
        self.record("dashboard".into());
        Self::next(&self.dashboards)
    }

    async fn fetch_habits(&self) -> Result<Vec<Habit>, BackendError> {
        self.record("habits".into());
        Ok(Vec::new())
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, BackendError> {
        self.record("tasks".into());
        Ok(Vec::new())
    }

    async fn complete_habit(&self, id: EntityId) -> Result<HabitCompletion, BackendError> {
        self.record(format!("habit:{id}"));
        self.wait_gate().await;
        Self::next(&self.habits)
    }

    async fn complete_task(&self, id: EntityId) -> Result<TaskCompletion, BackendError> {
        self.record(format!("task:{id}"));
        self.wait_gate().await;
        Self::next(&self.tasks)
    }

    async fn toggle_subtask(&self, id: EntityId) -> Result<SubtaskToggle, BackendError> {
        self.record(format!("subtask:{id}"));
        self.wait_gate().await;
        Self::next(&self.subtasks)
    }

    async fn record_focus_session(&self, completion: &FocusCompletion) -> Result<(), BackendError> {
        self.record(format!(
            "focus:{}x{}",
            completion.duration_minutes, completion.sessions_completed
        ));
        Self::next(&self.focus)
    }
}
