//! Focus session clock.
//!
//! A countdown state machine over repeated work/break cycles. Like the rest
//! of the engine it owns no thread: the periodic tick comes from a
//! [`Scheduler`] that the owner drains with [`SessionClock::poll`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle/Configuring -> RunningWork <-> Paused
//! RunningWork -> RunningBreak -> RunningWork (more iterations)
//! RunningBreak -> Finished (last iteration)
//! any non-terminal -> Cancelled
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SessionClock::new(IntervalScheduler::default());
//! clock.configure(SessionConfig::from_minutes(25, 5, 4))?;
//! clock.start()?;
//! // In a loop:
//! for event in clock.poll() { /* render */ }
//! ```

use chrono::Utc;
use tracing::debug;

use super::scheduler::{IntervalScheduler, Scheduler, SystemTimeSource};
use super::session::{FocusCompletion, SessionConfig, SessionPhase};
use crate::error::ClockError;
use crate::events::Event;

const TICK_INTERVAL_MS: u64 = 1000;

pub struct SessionClock<S: Scheduler = IntervalScheduler<SystemTimeSource>> {
    config: SessionConfig,
    phase: SessionPhase,
    remaining_seconds: u32,
    current_iteration: u32,
    saved_phase_before_pause: Option<SessionPhase>,
    completion: Option<FocusCompletion>,
    scheduler: S,
}

impl<S: Scheduler> SessionClock<S> {
    /// Create an idle clock with the default 25 minute, single-iteration
    /// configuration.
    pub fn new(scheduler: S) -> Self {
        let config = SessionConfig::default();
        Self {
            config,
            phase: SessionPhase::Idle,
            remaining_seconds: config.work_duration_seconds,
            current_iteration: 1,
            saved_phase_before_pause: None,
            completion: None,
            scheduler,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn saved_phase_before_pause(&self) -> Option<SessionPhase> {
        self.saved_phase_before_pause
    }

    /// Set once the session reaches Finished.
    pub fn completion(&self) -> Option<FocusCompletion> {
        self.completion
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Remaining time as `MM:SS`.
    pub fn formatted_remaining(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Open the settings panel.
    pub fn begin_configuring(&mut self) -> Result<(), ClockError> {
        match self.phase {
            SessionPhase::Idle
            | SessionPhase::Configuring
            | SessionPhase::Finished
            | SessionPhase::Cancelled => {
                self.reset_runtime(self.config);
                self.phase = SessionPhase::Configuring;
                Ok(())
            }
            from => Err(ClockError::InvalidTransition {
                from,
                action: "configure",
            }),
        }
    }

    /// Replace the configuration and reset to Idle. Terminal sessions may be
    /// reconfigured to start over; running or paused ones may not.
    pub fn configure(&mut self, config: SessionConfig) -> Result<Event, ClockError> {
        if !matches!(
            self.phase,
            SessionPhase::Idle
                | SessionPhase::Configuring
                | SessionPhase::Finished
                | SessionPhase::Cancelled
        ) {
            return Err(ClockError::InvalidTransition {
                from: self.phase,
                action: "configure",
            });
        }
        config.validate()?;
        self.reset_runtime(config);
        Ok(Event::SessionConfigured {
            config,
            at: Utc::now(),
        })
    }

    pub fn start(&mut self) -> Result<Event, ClockError> {
        match self.phase {
            SessionPhase::Idle | SessionPhase::Configuring => {
                self.phase = SessionPhase::RunningWork;
                self.scheduler.start(TICK_INTERVAL_MS);
                debug!(config = ?self.config, "focus session started");
                Ok(Event::SessionStarted {
                    config: self.config,
                    at: Utc::now(),
                })
            }
            from => Err(ClockError::InvalidTransition {
                from,
                action: "start",
            }),
        }
    }

    pub fn pause(&mut self) -> Result<Event, ClockError> {
        if !self.phase.is_running() {
            return Err(ClockError::InvalidTransition {
                from: self.phase,
                action: "pause",
            });
        }
        let phase = self.phase;
        self.scheduler.stop();
        self.saved_phase_before_pause = Some(phase);
        self.phase = SessionPhase::Paused;
        Ok(Event::SessionPaused {
            phase,
            remaining_seconds: self.remaining_seconds,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Result<Event, ClockError> {
        let saved = match (self.phase, self.saved_phase_before_pause) {
            (SessionPhase::Paused, Some(saved)) => saved,
            (from, _) => {
                return Err(ClockError::InvalidTransition {
                    from,
                    action: "resume",
                })
            }
        };
        self.phase = saved;
        self.saved_phase_before_pause = None;
        self.scheduler.start(TICK_INTERVAL_MS);
        Ok(Event::SessionResumed {
            phase: saved,
            remaining_seconds: self.remaining_seconds,
            at: Utc::now(),
        })
    }

    /// Abandon the session. Never produces a completion.
    pub fn cancel(&mut self) -> Result<Event, ClockError> {
        if self.phase.is_terminal() {
            return Err(ClockError::InvalidTransition {
                from: self.phase,
                action: "cancel",
            });
        }
        let from = self.phase;
        self.scheduler.stop();
        self.phase = SessionPhase::Cancelled;
        self.saved_phase_before_pause = None;
        debug!(?from, "focus session cancelled");
        Ok(Event::SessionCancelled {
            from,
            at: Utc::now(),
        })
    }

    /// Tear down when the owning view closes: cancels a live session and
    /// guarantees no further ticks.
    pub fn close(&mut self) -> Option<Event> {
        let event = if self.phase.is_terminal() {
            None
        } else {
            self.cancel().ok()
        };
        self.scheduler.stop();
        event
    }

    /// Apply every tick the scheduler has accumulated.
    pub fn poll(&mut self) -> Vec<Event> {
        let due = self.scheduler.due_ticks();
        let mut events = Vec::new();
        for _ in 0..due {
            if !self.phase.is_running() {
                break;
            }
            if let Some(event) = self.tick() {
                events.push(event);
            }
        }
        events
    }

    /// Advance one second. No-op unless work or break is running.
    pub(crate) fn tick(&mut self) -> Option<Event> {
        if !self.phase.is_running() {
            return None;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return None;
        }

        let from = self.phase;
        if from == SessionPhase::RunningWork && self.config.break_duration_seconds > 0 {
            self.phase = SessionPhase::RunningBreak;
            self.remaining_seconds = self.config.break_duration_seconds;
            return Some(self.phase_changed(from));
        }
        // Break elapsed, either for real or instantaneously.
        self.finish_break(from)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish_break(&mut self, from: SessionPhase) -> Option<Event> {
        if self.current_iteration < self.config.repeat_count {
            self.current_iteration += 1;
            self.phase = SessionPhase::RunningWork;
            self.remaining_seconds = self.config.work_duration_seconds;
            return Some(self.phase_changed(from));
        }

        self.scheduler.stop();
        self.phase = SessionPhase::Finished;
        let completion = FocusCompletion::from(&self.config);
        self.completion = Some(completion);
        debug!(?completion, "focus session finished");
        Some(Event::SessionFinished {
            completion,
            at: Utc::now(),
        })
    }

    fn phase_changed(&self, from: SessionPhase) -> Event {
        debug!(?from, to = ?self.phase, iteration = self.current_iteration, "phase changed");
        Event::PhaseChanged {
            from,
            to: self.phase,
            iteration: self.current_iteration,
            remaining_seconds: self.remaining_seconds,
            at: Utc::now(),
        }
    }

    fn reset_runtime(&mut self, config: SessionConfig) {
        self.scheduler.stop();
        self.config = config;
        self.phase = SessionPhase::Idle;
        self.remaining_seconds = config.work_duration_seconds;
        self.current_iteration = 1;
        self.saved_phase_before_pause = None;
        self.completion = None;
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new(IntervalScheduler::default())
    }
}

impl<S: Scheduler> Drop for SessionClock<S> {
    fn drop(&mut self) {
        self.scheduler.stop();
    }
}
