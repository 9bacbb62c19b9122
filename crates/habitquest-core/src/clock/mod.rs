mod engine;
mod scheduler;
mod session;

pub use engine::SessionClock;
pub use scheduler::{IntervalScheduler, ManualTimeSource, Scheduler, SystemTimeSource, TimeSource};
pub use session::{FocusCompletion, SessionConfig, SessionPhase};
