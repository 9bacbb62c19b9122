//! Periodic tick source for the session clock.
//!
//! There is no background thread. A [`Scheduler`] only remembers when its
//! next interval is due; the owner polls it and applies however many ticks
//! have elapsed. Stopping the scheduler therefore guarantees that no further
//! ticks are ever delivered.

use std::cell::Cell;
use std::rc::Rc;

/// Source of "now" in milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Virtual clock for tests. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Rc<Cell<u64>>,
}

impl ManualTimeSource {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Cancelable periodic schedule.
pub trait Scheduler {
    /// Begin (or restart) ticking every `interval_ms`, first tick one
    /// interval from now.
    fn start(&mut self, interval_ms: u64);

    /// Stop ticking. Ticks that were due but not yet collected are dropped.
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Collect the number of whole intervals elapsed since the last call.
    fn due_ticks(&mut self) -> u64;
}

/// [`Scheduler`] driven by a [`TimeSource`].
#[derive(Debug, Clone)]
pub struct IntervalScheduler<T: TimeSource> {
    time: T,
    interval_ms: u64,
    next_due_ms: Option<u64>,
}

impl<T: TimeSource> IntervalScheduler<T> {
    pub fn new(time: T) -> Self {
        Self {
            time,
            interval_ms: 0,
            next_due_ms: None,
        }
    }
}

impl Default for IntervalScheduler<SystemTimeSource> {
    fn default() -> Self {
        Self::new(SystemTimeSource)
    }
}

impl<T: TimeSource> Scheduler for IntervalScheduler<T> {
    fn start(&mut self, interval_ms: u64) {
        let interval_ms = interval_ms.max(1);
        self.interval_ms = interval_ms;
        self.next_due_ms = Some(self.time.now_ms() + interval_ms);
    }

    fn stop(&mut self) {
        self.next_due_ms = None;
    }

    fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    fn due_ticks(&mut self) -> u64 {
        let Some(next) = self.next_due_ms else {
            return 0;
        };
        let now = self.time.now_ms();
        if now < next {
            return 0;
        }
        let ticks = (now - next) / self.interval_ms + 1;
        self.next_due_ms = Some(next + ticks * self.interval_ms);
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_whole_intervals() {
        let time = ManualTimeSource::new(0);
        let mut sched = IntervalScheduler::new(time.clone());
        sched.start(1000);

        time.advance(999);
        assert_eq!(sched.due_ticks(), 0);
        time.advance(1);
        assert_eq!(sched.due_ticks(), 1);
        time.advance(2500);
        assert_eq!(sched.due_ticks(), 2);
        time.advance(500);
        assert_eq!(sched.due_ticks(), 1);
    }

    #[test]
    fn stop_drops_pending_ticks() {
        let time = ManualTimeSource::new(0);
        let mut sched = IntervalScheduler::new(time.clone());
        sched.start(1000);
        time.advance(5000);
        sched.stop();
        assert!(!sched.is_running());
        assert_eq!(sched.due_ticks(), 0);
    }

    #[test]
    fn restart_measures_from_now() {
        let time = ManualTimeSource::new(10_000);
        let mut sched = IntervalScheduler::new(time.clone());
        sched.start(1000);
        time.advance(400);
        sched.stop();
        time.advance(60_000);
        sched.start(1000);
        time.advance(999);
        assert_eq!(sched.due_ticks(), 0);
    }
}
