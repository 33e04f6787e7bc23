#![forbid(unsafe_code)]

//! Frame and timer scheduling interface.
//!
//! The selector is driven entirely by its host: the host owns the event
//! loop, calls [`Selector::on_frame`](crate::Selector::on_frame) once per
//! refresh for each live animator, and [`Selector::on_timer`](crate::Selector::on_timer)
//! when a single-shot timer expires.
//!
//! # Invariants
//!
//! - The selector holds at most one animator and one timer at a time, each
//!   tracked in a [`ScheduleSlot`].
//! - Arming a slot that is already armed cancels the previous id first.
//! - Callbacks carrying an id that no slot holds are stale and ignored.

use std::time::{Duration, Instant};

/// Handle for a per-frame callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimatorId(pub u64);

/// Handle for a single-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What the host should do with an animator after a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    /// Call again on the next frame.
    Continue,
    /// Unregister the animator; the selector has forgotten its id.
    Stop,
}

/// Host clock and callback registry.
pub trait Scheduler {
    /// Current loop time. Every sample taken while handling one callback
    /// should agree.
    fn now(&self) -> Instant;

    /// Register a per-frame callback.
    fn start_animator(&mut self) -> AnimatorId;

    /// Unregister a per-frame callback. Unknown ids are ignored.
    fn cancel_animator(&mut self, id: AnimatorId);

    /// Register a timer firing once after `delay`.
    fn start_timer(&mut self, delay: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already-fired ids are ignored.
    fn cancel_timer(&mut self, id: TimerId);
}

/// Holder for the single outstanding callback of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot<I> {
    live: Option<I>,
}

impl<I> Default for ScheduleSlot<I> {
    fn default() -> Self {
        Self { live: None }
    }
}

impl<I: Copy + PartialEq> ScheduleSlot<I> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self { live: None }
    }

    /// Whether a callback is outstanding.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.live.is_some()
    }

    /// The outstanding id, if any.
    #[must_use]
    pub fn get(&self) -> Option<I> {
        self.live
    }

    /// Whether `id` is the outstanding callback.
    #[must_use]
    pub fn matches(&self, id: I) -> bool {
        self.live == Some(id)
    }

    /// Store `id`, returning the id it replaces. The caller must cancel the
    /// returned id with the host.
    #[must_use = "a replaced id must be cancelled"]
    pub fn arm(&mut self, id: I) -> Option<I> {
        self.live.replace(id)
    }

    /// Forget the outstanding id and return it.
    pub fn take(&mut self) -> Option<I> {
        self.live.take()
    }
}
