use bevy::math::Vec2;
use std::time::Duration;

/// Spawn location that is locked for a while after each spawn.
///
/// Locks expire lazily: nothing runs when the lock lapses, availability is
/// recomputed from the timestamp every time it is asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupancySlot {
    location: Vec2,
    locked_until: Option<Duration>,
}

impl OccupancySlot {
    pub fn new(location: Vec2) -> Self {
        Self {
            location,
            locked_until: None,
        }
    }

    pub fn location(&self) -> Vec2 {
        self.location
    }

    pub fn locked_until(&self) -> Option<Duration> {
        self.locked_until
    }

    pub fn is_available(&self, now: Duration) -> bool {
        match self.locked_until {
            Some(until) => now >= until,
            None => true,
        }
    }

    /// Lock the slot from `now` for `duration`.
    pub fn lock(&mut self, now: Duration, duration: Duration) {
        self.locked_until = Some(now + duration);
    }

    pub fn unlock(&mut self) {
        self.locked_until = None;
    }
}
