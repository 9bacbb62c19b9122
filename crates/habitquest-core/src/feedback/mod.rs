//! Gamification event -> themed mascot notification.

mod flavor;
mod selector;

pub use flavor::Flavor;
pub use selector::{FeedbackNotification, FeedbackSelector};

/// How long a notification stays up unless superseded or dismissed.
pub const DEFAULT_TTL_MS: u64 = 10_000;
