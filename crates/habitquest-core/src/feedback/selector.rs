//! One-slot, auto-dismissing notification display.
//!
//! The newest event always preempts: there is no queue, and each show
//! starts a fresh TTL.

use serde::{Deserialize, Serialize};

use super::{Flavor, DEFAULT_TTL_MS};
use crate::clock::{SystemTimeSource, TimeSource};
use crate::events::GamificationEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackNotification {
    pub mascot_key: String,
    pub message_text: String,
    /// Epoch milliseconds of the moment of display.
    pub created_at_ms: u64,
    pub ttl_ms: u64,
}

impl FeedbackNotification {
    pub fn expires_at_ms(&self) -> u64 {
        self.created_at_ms.saturating_add(self.ttl_ms)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_at_ms()
    }
}

pub struct FeedbackSelector<T: TimeSource = SystemTimeSource> {
    time: T,
    ttl_ms: u64,
    active: Option<FeedbackNotification>,
}

impl Default for FeedbackSelector {
    fn default() -> Self {
        Self::new(SystemTimeSource)
    }
}

impl<T: TimeSource> FeedbackSelector<T> {
    pub fn new(time: T) -> Self {
        Self::with_ttl(time, DEFAULT_TTL_MS)
    }

    pub fn with_ttl(time: T, ttl_ms: u64) -> Self {
        Self {
            time,
            ttl_ms,
            active: None,
        }
    }

    /// Pure mapping from event to notification content.
    pub fn select(event: &GamificationEvent) -> (&'static str, String) {
        let flavor = Flavor::resolve(event);
        (flavor.mascot_key(), flavor.message(event))
    }

    /// Display the notification for `event`, replacing whatever is shown.
    pub fn show(&mut self, event: &GamificationEvent) -> &FeedbackNotification {
        let (mascot_key, message_text) = Self::select(event);
        self.active.insert(FeedbackNotification {
            mascot_key: mascot_key.to_string(),
            message_text,
            created_at_ms: self.time.now_ms(),
            ttl_ms: self.ttl_ms,
        })
    }

    /// Clear the slot. No-op when nothing is shown.
    pub fn dismiss(&mut self) {
        self.active = None;
    }

    /// TTL-triggered dismissal. Returns true if something was cleared.
    pub fn dismiss_expired(&mut self) -> bool {
        let now = self.time.now_ms();
        if self.active.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.active = None;
            return true;
        }
        false
    }

    /// The live notification, if its TTL has not run out.
    pub fn current(&mut self) -> Option<&FeedbackNotification> {
        self.dismiss_expired();
        self.active.as_ref()
    }
}
