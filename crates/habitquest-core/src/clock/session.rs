use serde::{Deserialize, Serialize};

use crate::error::ClockError;

/// Shortest work interval a session accepts, in seconds.
pub const MIN_WORK_SECONDS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Configuring,
    RunningWork,
    RunningBreak,
    Paused,
    Finished,
    Cancelled,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Finished | SessionPhase::Cancelled)
    }

    pub fn is_running(self) -> bool {
        matches!(self, SessionPhase::RunningWork | SessionPhase::RunningBreak)
    }
}

/// Shape of one focus session. Fixed once the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub work_duration_seconds: u32,
    pub break_duration_seconds: u32,
    pub repeat_count: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration_seconds: 25 * 60,
            break_duration_seconds: 0,
            repeat_count: 1,
        }
    }
}

impl SessionConfig {
    pub fn new(work_duration_seconds: u32, break_duration_seconds: u32, repeat_count: u32) -> Self {
        Self {
            work_duration_seconds,
            break_duration_seconds,
            repeat_count,
        }
    }

    /// Build from whole minutes, the unit users pick in.
    pub fn from_minutes(work_min: u32, break_min: u32, repeat_count: u32) -> Self {
        Self::new(
            work_min.saturating_mul(60),
            break_min.saturating_mul(60),
            repeat_count,
        )
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        if self.work_duration_seconds < MIN_WORK_SECONDS {
            return Err(ClockError::InvalidConfig {
                field: "work_duration_seconds",
                message: format!(
                    "must be at least {MIN_WORK_SECONDS}, got {}",
                    self.work_duration_seconds
                ),
            });
        }
        if self.repeat_count < 1 {
            return Err(ClockError::InvalidConfig {
                field: "repeat_count",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Work minutes as reported to the backend, rounded half-up.
    pub fn work_minutes_rounded(&self) -> u32 {
        (self.work_duration_seconds + 30) / 60
    }

    /// Ticks from start to Finished: every iteration pays work plus break.
    pub fn total_ticks(&self) -> u64 {
        u64::from(self.repeat_count)
            * (u64::from(self.work_duration_seconds) + u64::from(self.break_duration_seconds))
    }
}

/// Payload emitted when a session reaches Finished; also the
/// `focus-sessions/` request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusCompletion {
    pub duration_minutes: u32,
    pub sessions_completed: u32,
}

impl From<&SessionConfig> for FocusCompletion {
    fn from(config: &SessionConfig) -> Self {
        Self {
            duration_minutes: config.work_minutes_rounded(),
            sessions_completed: config.repeat_count,
        }
    }
}
