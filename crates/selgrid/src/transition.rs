#![forbid(unsafe_code)]

//! Transition controller.
//!
//! Every zoom or selection change animates from a snapshot of the current
//! zoom and pan towards a target, along a [`decelerate`] curve, over a
//! wall-clock [`Timeline`]. A single host animator drives it; requesting a
//! new transition while one is running restarts the timeline from wherever
//! the old one had got to and keeps the same animator.
//!
//! # State Machine
//!
//! ```text
//!            request                      t >= 1, no hop
//!   Idle ───────────────▶ Animating ─────────────────────▶ Idle
//!                            │                               ▲
//!                            │ t >= 1, exit-on-select,       │ t >= 1
//!                            │ not yet committed             │
//!                            ▼                               │
//!                       ClosingToFull ───────────────────────┘
//! ```
//!
//! Completion queues exactly one terminal event: `Selected` when the cycle
//! was a commit (or the exit-on-select hop), otherwise `Exit` when the cycle
//! was a cancel.

use std::time::{Duration, Instant};

use selgrid_core::animation::{Timeline, decelerate};
use selgrid_core::geometry::Point;
use selgrid_core::{debug, trace};

use crate::registry::SelectionFacets;
use crate::scene::Scene;
use crate::scheduler::{AnimatorId, FrameControl, Scheduler};
use crate::widget::{Selector, SelectorEvent, WidgetFlags};

/// Where the transition controller is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    /// No animator is live.
    #[default]
    Idle,
    /// Animating towards a zoom and pan target.
    Animating,
    /// Exit-on-select second hop: zooming back to full size after the
    /// selection settled.
    ClosingToFull,
}

/// Zoom and pan state, current and in flight.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Motion {
    pub zoom: f64,
    pub zoom_from: f64,
    pub zoom_to: f64,
    /// Unclamped pan from the last layout pass.
    pub pan: Point,
    pub pan_from: Point,
    pub pan_to: Point,
    pub timeline: Timeline,
    /// Eased fraction of the current timeline.
    pub interp: f64,
    pub phase: TransitionPhase,
}

impl Motion {
    pub fn new(now: Instant) -> Self {
        Self {
            zoom: 1.0,
            zoom_from: 1.0,
            zoom_to: 1.0,
            pan: Point::ZERO,
            pan_from: Point::ZERO,
            pan_to: Point::ZERO,
            timeline: Timeline::new(now, Duration::ZERO).easing(decelerate),
            interp: 0.0,
            phase: TransitionPhase::Idle,
        }
    }

    /// Snapshot the current state as the start of a new timeline.
    fn restart(&mut self, now: Instant, duration: Duration) {
        self.pan_from = self.pan;
        self.zoom_from = self.zoom;
        self.timeline = Timeline::new(now, duration).easing(decelerate);
        self.interp = 0.0;
        if self.phase == TransitionPhase::Idle {
            self.phase = TransitionPhase::Animating;
        }
    }

    fn sample(&mut self, now: Instant) -> f64 {
        let t = self.timeline.progress(now);
        self.interp = self.timeline.value(now);
        self.zoom = self.zoom_from + (self.zoom_to - self.zoom_from) * self.interp;
        t
    }
}

impl<S: Scene, T: Scheduler> Selector<S, T> {
    /// Animate to `zoom` over the configured transition duration.
    ///
    /// The pan target is recomputed from the selection on every frame, so
    /// this also settles any pending pan.
    pub fn zoom_to(&mut self, zoom: f64) {
        self.motion.zoom_to = zoom;
        self.begin_transition(self.config.transition);
    }

    /// Start (or restart) a transition lasting `duration`.
    pub(crate) fn begin_transition(&mut self, duration: Duration) {
        let now = self.scheduler.now();
        self.motion.restart(now, duration);
        trace!(
            zoom_from = self.motion.zoom_from,
            zoom_to = self.motion.zoom_to,
            duration_ms = duration.as_millis() as u64,
            "transition started"
        );
        if !self.animator.is_armed() {
            let id = self.scheduler.start_animator();
            if let Some(stale) = self.animator.arm(id) {
                self.scheduler.cancel_animator(stale);
            }
        }
    }

    /// Frame callback. The host calls this once per refresh for the
    /// animator it was handed, until it returns [`FrameControl::Stop`].
    pub fn on_frame(&mut self, id: AnimatorId) -> FrameControl {
        if !self.animator.matches(id) {
            trace!(animator = id.0, "stale animator ignored");
            return FrameControl::Stop;
        }

        let now = self.scheduler.now();
        let t = self.motion.sample(now);
        self.relayout();
        if t < 1.0 {
            return FrameControl::Continue;
        }

        if self.flags.contains(WidgetFlags::EXIT_ON_SELECT)
            && !self.flags.contains(WidgetFlags::EXIT_NOW)
        {
            self.cancel_autozoom();
            self.flags.insert(WidgetFlags::EXIT_NOW);
            self.push_event(SelectorEvent::Ending);
            self.zoom_to(1.0);
            self.motion.phase = TransitionPhase::ClosingToFull;
            return FrameControl::Continue;
        }

        self.animator.take();
        self.motion.phase = TransitionPhase::Idle;
        debug!(zoom = self.motion.zoom, "transition complete");

        if self
            .flags
            .intersects(WidgetFlags::SELECT_ME | WidgetFlags::EXIT_NOW)
        {
            if let Some(entry) = self.entries.last_with(SelectionFacets::SELECTED) {
                self.push_event(SelectorEvent::Selected(entry));
            }
        } else if self.flags.contains(WidgetFlags::EXIT_ME) {
            self.push_event(SelectorEvent::Exit);
        }
        FrameControl::Stop
    }

    /// Current phase of the transition controller.
    #[must_use]
    pub fn phase(&self) -> TransitionPhase {
        self.motion.phase
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.motion.zoom
    }

    /// Zoom factor the running transition is heading for.
    #[must_use]
    pub fn target_zoom(&self) -> f64 {
        self.motion.zoom_to
    }

    /// Eased progress of the current transition, in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.motion.interp
    }
}
