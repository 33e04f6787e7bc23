#![forbid(unsafe_code)]

//! Easing curves and wall-clock timelines.
//!
//! A [`Timeline`] is anchored at an [`Instant`] and reports how far along a
//! fixed duration a given `now` is. Unlike a tick-accumulating animation it
//! has no internal clock: callers sample it with the host's frame time, so a
//! dropped frame never slows the animation down.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use selgrid_core::animation::{Timeline, decelerate};
//!
//! let start = Instant::now();
//! let timeline = Timeline::new(start, Duration::from_millis(500)).easing(decelerate);
//! assert_eq!(timeline.progress(start), 0.0);
//! assert_eq!(timeline.value(start + Duration::from_secs(1)), 1.0);
//! ```

use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Easing functions
// ---------------------------------------------------------------------------

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f64) -> f64;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f64) -> f64 {
    t.clamp(0.0, 1.0)
}

/// Sinusoidal deceleration: `sin(t·π/2)`.
///
/// Starts at full speed and comes to rest with zero velocity at `t = 1`.
/// This is the curve zoom and pan transitions use.
#[inline]
pub fn decelerate(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t >= 1.0 {
        // sin(π/2) is not exactly 1.0 in floating point on every platform.
        return 1.0;
    }
    (t * FRAC_PI_2).sin()
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// A fixed-length span of wall-clock time with an easing curve.
#[derive(Debug, Clone, Copy)]
pub struct Timeline {
    start: Instant,
    duration: Duration,
    easing: EasingFn,
}

impl Timeline {
    /// Create a timeline starting at `start` and lasting `duration`.
    ///
    /// A zero duration is complete at any sample time.
    pub fn new(start: Instant, duration: Duration) -> Self {
        Self {
            start,
            duration,
            easing: linear,
        }
    }

    /// Set the easing function.
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// When the timeline started.
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Total length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Raw linear progress (before easing), in [0.0, 1.0].
    ///
    /// Samples taken before `start` report 0.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Eased progress at `now`.
    pub fn value(&self, now: Instant) -> f64 {
        (self.easing)(self.progress(now))
    }

    /// Whether `now` is at or past the end.
    pub fn is_complete(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }
}
