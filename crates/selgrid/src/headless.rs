#![forbid(unsafe_code)]

//! Deterministic headless host for testing.
//!
//! [`ManualScheduler`] is a virtual clock that only moves when told to, and
//! [`RecordingScene`] keeps a log of everything the selector asked the scene
//! to do. Together they drive a [`HeadlessSelector`] frame by frame without
//! any toolkit.
//!
//! # Example
//!
//! ```
//! use selgrid::headless::{HeadlessSelector, ManualScheduler, RecordingScene};
//! use selgrid::{Selector, SelectorConfig, SelectorEvent};
//! use selgrid_core::event::KeyCode;
//! use selgrid_core::geometry::Rect;
//!
//! let mut sel: HeadlessSelector =
//!     Selector::new(RecordingScene::new(), ManualScheduler::new(), SelectorConfig::default());
//! let first = sel.add_entry(0, true, false).unwrap();
//! sel.add_entry(1, false, false).unwrap();
//! sel.set_geometry(Rect::from_size(800, 600));
//! sel.start();
//!
//! sel.key_down(KeyCode::Enter);
//! sel.settle();
//! assert_eq!(
//!     sel.drain_events(),
//!     vec![SelectorEvent::Ending, SelectorEvent::Selected(first)]
//! );
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use selgrid_core::geometry::Rect;

use crate::registry::EntryId;
use crate::scene::{Cue, EntryMetadata, Scene};
use crate::scheduler::{AnimatorId, FrameControl, Scheduler, TimerId};
use crate::widget::Selector;

/// Frame interval used by [`HeadlessSelector::settle`] (about 60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Upper bound on frames [`HeadlessSelector::settle`] will run.
const MAX_SETTLE_FRAMES: usize = 10_000;

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Virtual clock with animator and timer bookkeeping.
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    epoch: Instant,
    now: Instant,
    next_id: u64,
    animators: Vec<AnimatorId>,
    timers: Vec<(TimerId, Instant)>,
    animators_started: usize,
    timers_started: usize,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualScheduler {
    /// A scheduler whose clock starts now and never moves on its own.
    #[must_use]
    pub fn new() -> Self {
        let epoch = Instant::now();
        Self {
            epoch,
            now: epoch,
            next_id: 0,
            animators: Vec::new(),
            timers: Vec::new(),
            animators_started: 0,
            timers_started: 0,
        }
    }

    /// Move the clock forward.
    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Time since the scheduler was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.now - self.epoch
    }

    /// Registered animators, oldest first.
    #[must_use]
    pub fn live_animators(&self) -> &[AnimatorId] {
        &self.animators
    }

    /// Whether any animator is registered.
    #[must_use]
    pub fn has_live_animator(&self) -> bool {
        !self.animators.is_empty()
    }

    /// Pending timers.
    #[must_use]
    pub fn live_timers(&self) -> Vec<TimerId> {
        self.timers.iter().map(|(id, _)| *id).collect()
    }

    /// Total animators ever started.
    #[must_use]
    pub fn animators_started(&self) -> usize {
        self.animators_started
    }

    /// Total timers ever started.
    #[must_use]
    pub fn timers_started(&self) -> usize {
        self.timers_started
    }

    /// Unregister an animator whose callback returned [`FrameControl::Stop`].
    pub fn finish_animator(&mut self, id: AnimatorId) {
        self.animators.retain(|a| *a != id);
    }

    /// Remove and return every timer due at the current time, earliest
    /// deadline first.
    pub fn take_due_timers(&mut self) -> Vec<TimerId> {
        let now = self.now;
        let mut due: Vec<(TimerId, Instant)> = Vec::new();
        self.timers.retain(|&(id, deadline)| {
            if deadline <= now {
                due.push((id, deadline));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|&(id, deadline)| (deadline, id));
        due.into_iter().map(|(id, _)| id).collect()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Instant {
        self.now
    }

    fn start_animator(&mut self) -> AnimatorId {
        let id = AnimatorId(self.next_id());
        self.animators.push(id);
        self.animators_started += 1;
        id
    }

    fn cancel_animator(&mut self, id: AnimatorId) {
        self.finish_animator(id);
    }

    fn start_timer(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.push((id, self.now + delay));
        self.timers_started += 1;
        id
    }

    fn cancel_timer(&mut self, id: TimerId) {
        self.timers.retain(|(t, _)| *t != id);
    }
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// Background handle issued by [`RecordingScene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackgroundId(pub u32);

/// One recorded scene call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneOp {
    /// A background was created for content.
    Create {
        background: BackgroundId,
        content: u32,
    },
    /// A background was destroyed.
    Destroy(BackgroundId),
    /// A background was placed.
    Place(BackgroundId, Rect),
    /// A cue ran.
    Cue(BackgroundId, Cue),
    /// A background was raised to the top.
    Raise(BackgroundId),
    /// A label was set.
    Label(BackgroundId, String),
    /// The selector was revealed.
    Reveal,
}

/// Scene that records every call. Content is a plain `u32`.
#[derive(Debug, Default)]
pub struct RecordingScene {
    next: u32,
    ops: Vec<SceneOp>,
    metadata: HashMap<u32, EntryMetadata>,
    labels: HashMap<BackgroundId, String>,
    placements: HashMap<BackgroundId, Rect>,
    /// Bottom to top.
    stack: Vec<BackgroundId>,
    revealed: bool,
    destroyed: Rc<RefCell<Vec<BackgroundId>>>,
}

impl RecordingScene {
    /// An empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `content` a metadata source.
    pub fn set_metadata(&mut self, content: u32, metadata: EntryMetadata) {
        self.metadata.insert(content, metadata);
    }

    /// Remove `content`'s metadata source.
    pub fn remove_metadata(&mut self, content: u32) {
        self.metadata.remove(&content);
    }

    /// Calls recorded since the last [`take_ops`](Self::take_ops).
    #[must_use]
    pub fn ops(&self) -> &[SceneOp] {
        &self.ops
    }

    /// Take the recorded calls, clearing the log.
    pub fn take_ops(&mut self) -> Vec<SceneOp> {
        std::mem::take(&mut self.ops)
    }

    /// Cues recorded since the last [`take_ops`](Self::take_ops), in order.
    #[must_use]
    pub fn cues(&self) -> Vec<(BackgroundId, Cue)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SceneOp::Cue(bg, cue) => Some((*bg, *cue)),
                _ => None,
            })
            .collect()
    }

    /// Current label of a background.
    #[must_use]
    pub fn label(&self, background: BackgroundId) -> Option<&str> {
        self.labels.get(&background).map(String::as_str)
    }

    /// Last placement of a background.
    #[must_use]
    pub fn placement(&self, background: BackgroundId) -> Option<Rect> {
        self.placements.get(&background).copied()
    }

    /// Stacking order, bottom to top.
    #[must_use]
    pub fn stacking(&self) -> &[BackgroundId] {
        &self.stack
    }

    /// Topmost background.
    #[must_use]
    pub fn top(&self) -> Option<BackgroundId> {
        self.stack.last().copied()
    }

    /// Whether [`Scene::reveal`] was called.
    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Shared list of destroyed backgrounds; outlives the scene.
    #[must_use]
    pub fn destroyed_handle(&self) -> Rc<RefCell<Vec<BackgroundId>>> {
        Rc::clone(&self.destroyed)
    }
}

impl Scene for RecordingScene {
    type Content = u32;
    type Background = BackgroundId;

    fn create_background(&mut self, content: &u32) -> BackgroundId {
        let background = BackgroundId(self.next);
        self.next += 1;
        self.stack.push(background);
        self.ops.push(SceneOp::Create {
            background,
            content: *content,
        });
        background
    }

    fn destroy_background(&mut self, background: BackgroundId) {
        self.stack.retain(|b| *b != background);
        self.placements.remove(&background);
        self.labels.remove(&background);
        self.destroyed.borrow_mut().push(background);
        self.ops.push(SceneOp::Destroy(background));
    }

    fn place(&mut self, background: &BackgroundId, rect: Rect) {
        self.placements.insert(*background, rect);
        self.ops.push(SceneOp::Place(*background, rect));
    }

    fn emit_cue(&mut self, background: &BackgroundId, cue: Cue) {
        self.ops.push(SceneOp::Cue(*background, cue));
    }

    fn raise(&mut self, background: &BackgroundId) {
        self.stack.retain(|b| b != background);
        self.stack.push(*background);
        self.ops.push(SceneOp::Raise(*background));
    }

    fn set_label(&mut self, background: &BackgroundId, label: &str) {
        self.labels.insert(*background, label.to_owned());
        self.ops.push(SceneOp::Label(*background, label.to_owned()));
    }

    fn metadata(&self, content: &u32) -> Option<EntryMetadata> {
        self.metadata.get(content).cloned()
    }

    fn reveal(&mut self) {
        self.revealed = true;
        self.ops.push(SceneOp::Reveal);
    }
}

// ---------------------------------------------------------------------------
// Pump helpers
// ---------------------------------------------------------------------------

/// Selector wired to the headless host.
pub type HeadlessSelector = Selector<RecordingScene, ManualScheduler>;

impl Selector<RecordingScene, ManualScheduler> {
    /// Run one frame callback for every live animator, unregistering those
    /// that stop. Returns how many callbacks ran.
    pub fn pump_frame(&mut self) -> usize {
        let live: Vec<AnimatorId> = self.scheduler.live_animators().to_vec();
        for &id in &live {
            if self.on_frame(id) == FrameControl::Stop {
                self.scheduler.finish_animator(id);
            }
        }
        live.len()
    }

    /// Fire every timer due at the current time. Returns how many fired.
    pub fn fire_due_timers(&mut self) -> usize {
        let due = self.scheduler.take_due_timers();
        for &id in &due {
            self.on_timer(id);
        }
        due.len()
    }

    /// Move the clock by `dt`, fire due timers, then run one frame.
    pub fn advance(&mut self, dt: Duration) {
        self.scheduler.advance(dt);
        self.fire_due_timers();
        self.pump_frame();
    }

    /// Advance in [`FRAME_INTERVAL`] steps until no animator is live.
    /// Returns the number of frames run.
    pub fn settle(&mut self) -> usize {
        let mut frames = 0;
        while self.scheduler.has_live_animator() && frames < MAX_SETTLE_FRAMES {
            self.advance(FRAME_INTERVAL);
            frames += 1;
        }
        frames
    }

    /// Background handle of `entry`.
    #[must_use]
    pub fn background_of(&self, entry: EntryId) -> Option<BackgroundId> {
        self.background(entry).ok().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_only_moves_when_advanced() {
        let mut sched = ManualScheduler::new();
        let t0 = sched.now();
        assert_eq!(sched.now(), t0);
        sched.advance(Duration::from_millis(40));
        assert_eq!(sched.now() - t0, Duration::from_millis(40));
        assert_eq!(sched.elapsed(), Duration::from_millis(40));
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut sched = ManualScheduler::new();
        let late = sched.start_timer(Duration::from_millis(300));
        let early = sched.start_timer(Duration::from_millis(100));
        let never = sched.start_timer(Duration::from_secs(5));
        sched.advance(Duration::from_millis(300));
        assert_eq!(sched.take_due_timers(), vec![early, late]);
        assert_eq!(sched.live_timers(), vec![never]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut sched = ManualScheduler::new();
        let id = sched.start_timer(Duration::from_millis(10));
        sched.cancel_timer(id);
        sched.advance(Duration::from_secs(1));
        assert!(sched.take_due_timers().is_empty());
    }

    #[test]
    fn animator_ids_are_unique() {
        let mut sched = ManualScheduler::new();
        let a = sched.start_animator();
        let b = sched.start_animator();
        assert_ne!(a, b);
        sched.cancel_animator(a);
        assert_eq!(sched.live_animators(), &[b]);
        assert_eq!(sched.animators_started(), 2);
    }

    #[test]
    fn scene_tracks_stacking_and_labels() {
        let mut scene = RecordingScene::new();
        let a = scene.create_background(&10);
        let b = scene.create_background(&11);
        assert_eq!(scene.top(), Some(b));
        scene.raise(&a);
        assert_eq!(scene.stacking(), &[b, a]);
        scene.set_label(&a, "one");
        assert_eq!(scene.label(a), Some("one"));
        assert_eq!(scene.label(b), None);
    }

    #[test]
    fn scene_metadata_lookup() {
        let mut scene = RecordingScene::new();
        assert_eq!(scene.metadata(&3), None);
        scene.set_metadata(3, EntryMetadata::titled("zsh"));
        assert_eq!(scene.metadata(&3), Some(EntryMetadata::titled("zsh")));
        scene.remove_metadata(3);
        assert_eq!(scene.metadata(&3), None);
    }
}
