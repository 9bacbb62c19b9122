//! Client-side copy of habits and tasks.

use std::collections::BTreeMap;

use crate::backend::{HabitCompletion, TaskCompletion};
use crate::model::{CompletionState, EntityId, EntityKind, Habit, Task, Theme};

/// Entity state captured before an optimistic mutation.
#[derive(Debug, Clone)]
pub(crate) enum Prior {
    Habit(Habit),
    Task(Task),
}

impl Prior {
    pub fn is_completed(&self) -> bool {
        match self {
            Prior::Habit(h) => h.state.is_completed(),
            Prior::Task(t) => t.state.is_completed(),
        }
    }

    pub fn theme(&self) -> Option<Theme> {
        match self {
            Prior::Habit(h) => h.theme,
            Prior::Task(t) => t.theme,
        }
    }
}

/// Authoritative fields returned by a completion call.
#[derive(Debug, Clone)]
pub(crate) enum Confirmation {
    Habit(HabitCompletion),
    Task(TaskCompletion),
}

impl Confirmation {
    pub fn xp_awarded(&self) -> Option<u32> {
        match self {
            Confirmation::Habit(c) => c.xp_awarded,
            Confirmation::Task(c) => c.xp_awarded,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityCache {
    habits: BTreeMap<EntityId, Habit>,
    tasks: BTreeMap<EntityId, Task>,
}

impl EntityCache {
    pub fn replace_habits(&mut self, habits: Vec<Habit>) {
        self.habits = habits.into_iter().map(|h| (h.id, h)).collect();
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks.into_iter().map(|t| (t.id, t)).collect();
    }

    pub fn habit(&self, id: EntityId) -> Option<&Habit> {
        self.habits.get(&id)
    }

    pub fn task(&self, id: EntityId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    pub fn habits(&self) -> impl Iterator<Item = &Habit> {
        self.habits.values()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn remove_habit(&mut self, id: EntityId) -> Option<Habit> {
        self.habits.remove(&id)
    }

    pub fn remove_task(&mut self, id: EntityId) -> Option<Task> {
        self.tasks.remove(&id)
    }

    pub fn clear(&mut self) {
        self.habits.clear();
        self.tasks.clear();
    }

    /// Owning task and current state of a subtask.
    pub fn find_subtask(&self, subtask_id: EntityId) -> Option<(EntityId, CompletionState)> {
        self.tasks.values().find_map(|t| {
            t.subtasks
                .iter()
                .find(|s| s.id == subtask_id)
                .map(|s| (t.id, s.state))
        })
    }

    pub(crate) fn prior(&self, kind: EntityKind, id: EntityId) -> Option<Prior> {
        match kind {
            EntityKind::Habit => self.habits.get(&id).cloned().map(Prior::Habit),
            EntityKind::Task => self.tasks.get(&id).cloned().map(Prior::Task),
            EntityKind::Subtask => None,
        }
    }

    /// Optimistic completion. A task takes its subtasks with it.
    pub(crate) fn mark_completed(&mut self, kind: EntityKind, id: EntityId) -> bool {
        match kind {
            EntityKind::Habit => match self.habits.get_mut(&id) {
                Some(h) => {
                    h.state = CompletionState::Completed;
                    true
                }
                None => false,
            },
            EntityKind::Task => match self.tasks.get_mut(&id) {
                Some(t) => {
                    complete_task(t);
                    true
                }
                None => false,
            },
            EntityKind::Subtask => false,
        }
    }

    /// Put the captured prior state back. False if the entity is gone.
    pub(crate) fn restore(&mut self, prior: Prior) -> bool {
        match prior {
            Prior::Habit(h) => match self.habits.get_mut(&h.id) {
                Some(slot) => {
                    *slot = h;
                    true
                }
                None => false,
            },
            Prior::Task(t) => match self.tasks.get_mut(&t.id) {
                Some(slot) => {
                    *slot = t;
                    true
                }
                None => false,
            },
        }
    }

    /// Overwrite optimistic guesses with the backend's answer. False if the
    /// entity is gone.
    pub(crate) fn merge(&mut self, id: EntityId, confirmation: &Confirmation) -> bool {
        match confirmation {
            Confirmation::Habit(c) => match self.habits.get_mut(&id) {
                Some(h) => {
                    h.state = c.is_completed.into();
                    if let Some(streak) = c.streak {
                        h.current_streak = streak;
                    }
                    true
                }
                None => false,
            },
            Confirmation::Task(c) => match self.tasks.get_mut(&id) {
                Some(t) => {
                    if c.is_completed {
                        complete_task(t);
                    } else {
                        t.state = CompletionState::Pending;
                    }
                    true
                }
                None => false,
            },
        }
    }

    pub(crate) fn set_subtask_state(
        &mut self,
        task_id: EntityId,
        subtask_id: EntityId,
        state: CompletionState,
    ) -> bool {
        match self
            .tasks
            .get_mut(&task_id)
            .and_then(|t| t.subtask_mut(subtask_id))
        {
            Some(sub) => {
                sub.state = state;
                true
            }
            None => false,
        }
    }
}

fn complete_task(task: &mut Task) {
    task.state = CompletionState::Completed;
    for sub in &mut task.subtasks {
        sub.state = CompletionState::Completed;
    }
}
