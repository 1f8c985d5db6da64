//! Timed sequences
//!
//! A sequence waits for a delay (in scaled seconds) and then yields a single
//! follow-up action for its owner to apply. Each object holds at most one;
//! starting a new one overwrites the old.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sequence<A> {
    /// Seconds left before `action` fires
    pub remaining: f32,
    pub action: A,
}

impl<A: Copy> Sequence<A> {
    pub fn new(delay: f32, action: A) -> Self {
        Self {
            remaining: delay.max(0.0),
            action,
        }
    }

    /// Advance by `dt`; returns the action once the delay has elapsed
    pub fn advance(&mut self, dt: f32) -> Option<A> {
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            self.remaining = 0.0;
            Some(self.action)
        } else {
            None
        }
    }
}

/// Advance an optional sequence, clearing the slot when it fires
pub fn advance_slot<A: Copy>(slot: &mut Option<Sequence<A>>, dt: f32) -> Option<A> {
    let fired = slot.as_mut()?.advance(dt);
    if fired.is_some() {
        *slot = None;
    }
    fired
}
