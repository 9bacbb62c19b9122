use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::{FocusCompletion, SessionConfig, SessionPhase};
use crate::model::{EntityId, Theme};

/// What earned the reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamificationKind {
    HabitCompleted,
    TaskCompleted,
    FocusCompleted,
}

/// Derived outcome of one confirmed completion. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationEvent {
    pub kind: GamificationKind,
    /// `None` for focus sessions.
    pub theme: Option<Theme>,
    pub xp_awarded: u32,
    pub leveled_up: bool,
    /// Set only when `leveled_up`.
    pub new_level: Option<u32>,
}

impl GamificationEvent {
    /// Build an event, deriving the level-up fields from the level seen
    /// before and after the refresh.
    pub fn derive(
        kind: GamificationKind,
        theme: Option<Theme>,
        xp_awarded: u32,
        old_level: Option<u32>,
        new_level: Option<u32>,
    ) -> Self {
        let leveled_up = matches!((old_level, new_level), (Some(old), Some(new)) if new > old);
        Self {
            kind,
            theme,
            xp_awarded,
            leveled_up,
            new_level: if leveled_up { new_level } else { None },
        }
    }
}

/// Every state change the engine reports to the view layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionConfigured {
        config: SessionConfig,
        at: DateTime<Utc>,
    },
    SessionStarted {
        config: SessionConfig,
        at: DateTime<Utc>,
    },
    SessionPaused {
        phase: SessionPhase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    SessionResumed {
        phase: SessionPhase,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    /// Work/break boundary crossed. An instantaneous break reports
    /// RunningWork -> RunningWork with the next iteration.
    PhaseChanged {
        from: SessionPhase,
        to: SessionPhase,
        iteration: u32,
        remaining_seconds: u32,
        at: DateTime<Utc>,
    },
    SessionFinished {
        completion: FocusCompletion,
        at: DateTime<Utc>,
    },
    SessionCancelled {
        from: SessionPhase,
        at: DateTime<Utc>,
    },
    SubtaskToggled {
        task_id: EntityId,
        subtask_id: EntityId,
        completed: bool,
        at: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_detects_level_increase() {
        let ev = GamificationEvent::derive(
            GamificationKind::HabitCompleted,
            Some(Theme::Sleep),
            40,
            Some(2),
            Some(3),
        );
        assert!(ev.leveled_up);
        assert_eq!(ev.new_level, Some(3));
    }

    #[test]
    fn derive_without_refresh_never_levels() {
        let ev = GamificationEvent::derive(GamificationKind::TaskCompleted, None, 10, Some(2), None);
        assert!(!ev.leveled_up);
        assert_eq!(ev.new_level, None);
    }

    #[test]
    fn event_is_tagged_by_type() {
        let ev = Event::SessionCancelled {
            from: SessionPhase::Paused,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "SessionCancelled");
        assert_eq!(json["from"], "paused");
    }
}
