#![forbid(unsafe_code)]

//! The selector widget.
//!
//! [`Selector`] owns the entries and the animation state and is driven by
//! its host through `&mut self` calls: input, geometry changes, frame and
//! timer callbacks. Each call runs to completion, so no input ever observes
//! a half-applied selection change.
//!
//! # Lifecycle
//!
//! 1. [`Selector::new`] with a [`Scene`] and a [`Scheduler`].
//! 2. [`Selector::add_entry`] once per entry, in grid order.
//! 3. [`Selector::set_geometry`], then [`Selector::start`].
//! 4. Feed input and callbacks; collect [`SelectorEvent`]s with
//!    [`Selector::drain_events`].
//! 5. Drop the selector once it reports `Selected` or `Exit`.

use std::time::Instant;

use bitflags::bitflags;
use selgrid_core::geometry::{Point, Rect, Size};
use selgrid_core::debug;

use crate::config::SelectorConfig;
use crate::error::SelectorError;
use crate::layout::GridDims;
use crate::registry::{Entry, EntryId, Registry, SelectionFacets};
use crate::scene::{Cue, Scene};
use crate::scheduler::{AnimatorId, ScheduleSlot, Scheduler, TimerId};
use crate::transition::Motion;

/// Notifications queued for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorEvent {
    /// A tap landed outside every cell.
    Clicked,
    /// A commit or cancel started; the selector is zooming back to full size.
    Ending,
    /// The final transition completed on a committed entry.
    Selected(EntryId),
    /// The final transition completed after a cancel.
    Exit,
}

bitflags! {
    /// Widget-level mode bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WidgetFlags: u8 {
        /// A commit is in flight; completion reports `Selected`.
        const SELECT_ME       = 1 << 0;
        /// A cancel is in flight; completion reports `Exit`.
        const EXIT_ME         = 1 << 1;
        /// Select-and-close mode: pointer input is ignored and the first
        /// settled transition chains into a zoom back to full size.
        const EXIT_ON_SELECT  = 1 << 2;
        /// The exit-on-select hop has started.
        const EXIT_NOW        = 1 << 3;
        /// Selection cues are owed to the next laid-out pass.
        const PENDING_VISUALS = 1 << 4;
        /// The pan target was set directly by hovering rather than derived
        /// from the selection.
        const DIRECT_PAN      = 1 << 5;
    }
}

/// Animated selector grid.
///
/// `S` is the host scene graph and `T` the host scheduler.
pub struct Selector<S: Scene, T: Scheduler> {
    pub(crate) scene: S,
    pub(crate) scheduler: T,
    pub(crate) config: SelectorConfig,
    pub(crate) entries: Registry<S::Content, S::Background>,
    /// Viewport in canvas coordinates.
    pub(crate) viewport: Rect,
    /// Size recorded by the last geometry pass; zero until the host sizes us.
    pub(crate) laid_out: Size,
    pub(crate) motion: Motion,
    /// Clamped pan offset of the last layout pass.
    pub(crate) rendered_pan: Point,
    pub(crate) baseline_zoom: f64,
    pub(crate) flags: WidgetFlags,
    pub(crate) press: Option<Point>,
    pub(crate) last_command: Option<Instant>,
    pub(crate) animator: ScheduleSlot<AnimatorId>,
    pub(crate) autozoom_timer: ScheduleSlot<TimerId>,
    pub(crate) events: Vec<SelectorEvent>,
}

impl<S: Scene, T: Scheduler> Selector<S, T> {
    /// Create an empty selector.
    ///
    /// The configuration is used as given; see [`Selector::try_new`] to
    /// validate it first.
    pub fn new(scene: S, scheduler: T, config: SelectorConfig) -> Self {
        let now = scheduler.now();
        Self {
            scene,
            scheduler,
            config,
            entries: Registry::default(),
            viewport: Rect::default(),
            laid_out: Size::ZERO,
            motion: Motion::new(now),
            rendered_pan: Point::ZERO,
            baseline_zoom: 1.0,
            flags: WidgetFlags::empty(),
            press: None,
            last_command: None,
            animator: ScheduleSlot::new(),
            autozoom_timer: ScheduleSlot::new(),
            events: Vec::new(),
        }
    }

    /// Create an empty selector after validating `config`.
    pub fn try_new(scene: S, scheduler: T, config: SelectorConfig) -> Result<Self, SelectorError> {
        config.validate()?;
        Ok(Self::new(scene, scheduler, config))
    }

    /// Append an entry at the end of the grid.
    ///
    /// An entry added as `selected` becomes the selection, the pan origin
    /// and the entry `Escape` returns to. If an earlier entry was also
    /// added as selected it keeps only its original-selection mark.
    pub fn add_entry(
        &mut self,
        content: S::Content,
        selected: bool,
        bell: bool,
    ) -> Result<EntryId, SelectorError> {
        self.entries.reserve_one()?;

        if selected {
            self.demote_selection();
        }

        let background = self.scene.create_background(&content);
        self.scene.raise(&background);
        if selected {
            self.scene.emit_cue(&background, Cue::SelectedStart);
        }
        if bell {
            self.scene.emit_cue(&background, Cue::Bell);
            if !self.config.bell_rings {
                self.scene.emit_cue(&background, Cue::BellRing);
            }
        }
        self.motion.interp = 1.0;

        let metadata = self.scene.metadata(&content);
        if let Some(meta) = &metadata {
            let label = meta.title.as_deref().unwrap_or(&self.config.default_label);
            self.scene.set_label(&background, label);
        }

        let facets = if selected {
            SelectionFacets::SELECTED
                | SelectionFacets::SELECTED_BEFORE
                | SelectionFacets::SELECTED_ORIGINAL
        } else {
            SelectionFacets::empty()
        };
        let mut entry = Entry::new(content, background, facets);
        entry.metadata_attached = metadata.is_some();
        let id = self.entries.push(entry);
        debug!(entry = id.index(), selected, bell, "entry added");
        Ok(id)
    }

    /// Strip `SELECTED` and `SELECTED_BEFORE` from every entry, owing or
    /// emitting the `Unselected` cue.
    fn demote_selection(&mut self) {
        let visible = !self.laid_out.is_empty();
        for (_, entry) in self.entries.iter_mut() {
            if entry.is_selected() {
                if visible {
                    self.scene.emit_cue(&entry.background, Cue::Unselected);
                } else {
                    entry.facets.insert(SelectionFacets::WAS_SELECTED);
                    self.flags.insert(WidgetFlags::PENDING_VISUALS);
                }
            }
            entry
                .facets
                .remove(SelectionFacets::SELECTED | SelectionFacets::SELECTED_BEFORE);
        }
    }

    /// Lay out, reveal, and bring the selected entry to the top.
    pub fn start(&mut self) {
        self.relayout();
        self.scene.reveal();
        if let Some(id) = self.entries.selected()
            && let Ok(entry) = self.entries.get(id)
        {
            self.scene.raise(&entry.background);
        }
        debug!(entries = self.entries.len(), "selector started");
    }

    /// Move or resize the viewport. An unchanged rectangle is ignored.
    pub fn set_geometry(&mut self, rect: Rect) {
        if rect == self.viewport {
            return;
        }
        self.viewport = rect;
        self.laid_out = rect.size();
        self.relayout();
    }

    /// Zoom restored when rapid navigation pauses.
    pub fn set_baseline_zoom(&mut self, zoom: f64) {
        self.baseline_zoom = zoom;
    }

    /// Switch to select-and-close mode: once the current transition
    /// settles, the selector zooms back to full size on the selection and
    /// reports it. Pointer input is ignored from here on.
    pub fn request_exit_on_select(&mut self) {
        self.flags.insert(WidgetFlags::EXIT_ON_SELECT);
    }

    /// Set an entry's label text directly.
    pub fn set_entry_title(&mut self, entry: EntryId, title: &str) -> Result<(), SelectorError> {
        let slot = self.entries.get(entry)?;
        self.scene.set_label(&slot.background, title);
        Ok(())
    }

    /// Stop tracking an entry's metadata source. Visuals stay as they are.
    pub fn close_entry(&mut self, entry: EntryId) -> Result<(), SelectorError> {
        self.entries.get_mut(entry)?.metadata_attached = false;
        Ok(())
    }

    /// Look the entry's metadata source up again and relabel from it.
    pub fn refresh_entry_metadata(&mut self, entry: EntryId) -> Result<(), SelectorError> {
        let slot = self.entries.get_mut(entry)?;
        let metadata = slot
            .content
            .as_ref()
            .and_then(|content| self.scene.metadata(content));
        slot.metadata_attached = metadata.is_some();
        if let Some(meta) = metadata {
            let label = meta.title.as_deref().unwrap_or(&self.config.default_label);
            self.scene.set_label(&slot.background, label);
        }
        Ok(())
    }

    /// The host destroyed an entry's content. The cell stays in the grid
    /// with its background; only the content reference is dropped.
    pub fn content_deleted(&mut self, entry: EntryId) -> Result<(), SelectorError> {
        let slot = self.entries.get_mut(entry)?;
        slot.content = None;
        slot.metadata_attached = false;
        debug!(entry = entry.index(), "content deleted");
        Ok(())
    }

    /// Take every queued notification, oldest first.
    pub fn drain_events(&mut self) -> Vec<SelectorEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: SelectorEvent) {
        debug!(?event, "selector event");
        self.events.push(event);
    }

    // --- Accessors ---

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Host scene.
    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    /// Host scene, mutably.
    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Host scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    /// Host scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grid dimensions for the current entry count.
    #[must_use]
    pub fn grid_dims(&self) -> GridDims {
        GridDims::for_count(self.entries.len())
    }

    /// Viewport rectangle.
    #[must_use]
    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Pan offset of the last layout pass, after clamping.
    #[must_use]
    pub fn pan(&self) -> Point {
        self.rendered_pan
    }

    /// Zoom restored after rapid navigation.
    #[must_use]
    pub fn baseline_zoom(&self) -> f64 {
        self.baseline_zoom
    }

    /// Widget mode bits.
    #[must_use]
    pub fn flags(&self) -> WidgetFlags {
        self.flags
    }

    /// Content of `entry`, if the host has not deleted it.
    pub fn content(&self, entry: EntryId) -> Result<Option<&S::Content>, SelectorError> {
        Ok(self.entries.get(entry)?.content.as_ref())
    }

    /// Background handle of `entry`.
    pub fn background(&self, entry: EntryId) -> Result<&S::Background, SelectorError> {
        Ok(&self.entries.get(entry)?.background)
    }

    /// Where `entry` was last placed.
    pub fn cell_rect(&self, entry: EntryId) -> Result<Rect, SelectorError> {
        Ok(self.entries.get(entry)?.cell)
    }

    /// Whether title lookups are live for `entry`.
    pub fn is_metadata_attached(&self, entry: EntryId) -> Result<bool, SelectorError> {
        Ok(self.entries.get(entry)?.metadata_attached)
    }

    /// Entry ids in grid order.
    pub fn entry_ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().map(|(id, _)| id)
    }
}

impl<S: Scene, T: Scheduler> Drop for Selector<S, T> {
    fn drop(&mut self) {
        if let Some(id) = self.animator.take() {
            self.scheduler.cancel_animator(id);
        }
        if let Some(id) = self.autozoom_timer.take() {
            self.scheduler.cancel_timer(id);
        }
        for entry in self.entries.drain() {
            self.scene.destroy_background(entry.background);
        }
    }
}

impl<S, T> std::fmt::Debug for Selector<S, T>
where
    S: Scene,
    T: Scheduler,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("entries", &self.entries.len())
            .field("viewport", &self.viewport)
            .field("zoom", &self.motion.zoom)
            .field("phase", &self.motion.phase)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use selgrid_core::geometry::Rect;

    use super::*;
    use crate::headless::{BackgroundId, HeadlessSelector, ManualScheduler, RecordingScene, SceneOp};
    use crate::scene::EntryMetadata;

    fn selector() -> HeadlessSelector {
        Selector::new(
            RecordingScene::new(),
            ManualScheduler::new(),
            SelectorConfig::default(),
        )
    }

    #[test]
    fn try_new_rejects_bad_config() {
        let config = SelectorConfig::default().autozoom_factor(0.0);
        let result = Selector::try_new(RecordingScene::new(), ManualScheduler::new(), config);
        assert!(matches!(result, Err(SelectorError::InvalidConfig(_))));
    }

    #[test]
    fn add_entry_facets_and_cues() {
        let mut sel = selector();
        let a = sel.add_entry(1, false, false).unwrap();
        let b = sel.add_entry(2, true, true).unwrap();
        assert_eq!(sel.facets(a).unwrap(), SelectionFacets::empty());
        assert_eq!(
            sel.facets(b).unwrap(),
            SelectionFacets::SELECTED
                | SelectionFacets::SELECTED_BEFORE
                | SelectionFacets::SELECTED_ORIGINAL
        );
        let bg = *sel.background(b).unwrap();
        assert_eq!(
            sel.scene().cues(),
            vec![(bg, Cue::SelectedStart), (bg, Cue::Bell)]
        );
        assert_eq!(sel.progress(), 1.0);
    }

    #[test]
    fn bell_rings_cue_when_bells_are_off() {
        let mut sel = Selector::new(
            RecordingScene::new(),
            ManualScheduler::new(),
            SelectorConfig::default().bell_rings(false),
        );
        let id = sel.add_entry(1, false, true).unwrap();
        let bg = *sel.background(id).unwrap();
        assert_eq!(sel.scene().cues(), vec![(bg, Cue::Bell), (bg, Cue::BellRing)]);
    }

    #[test]
    fn every_background_raised_on_add() {
        let mut sel = selector();
        sel.add_entry(1, false, false).unwrap();
        let b = sel.add_entry(2, false, false).unwrap();
        assert_eq!(sel.scene().top(), Some(*sel.background(b).unwrap()));
    }

    #[test]
    fn second_initial_selection_demotes_first() {
        let mut sel = selector();
        let a = sel.add_entry(1, true, false).unwrap();
        let b = sel.add_entry(2, true, false).unwrap();
        assert_eq!(sel.selected(), Some(b));
        let fa = sel.facets(a).unwrap();
        assert!(!fa.contains(SelectionFacets::SELECTED));
        assert!(!fa.contains(SelectionFacets::SELECTED_BEFORE));
        assert!(fa.contains(SelectionFacets::SELECTED_ORIGINAL));
        assert!(fa.contains(SelectionFacets::WAS_SELECTED));
        assert_eq!(sel.original_selection(), Some(b));
    }

    #[test]
    fn labels_from_metadata() {
        let mut scene = RecordingScene::new();
        scene.set_metadata(1, EntryMetadata::titled("vim"));
        scene.set_metadata(2, EntryMetadata::default());
        let mut sel = Selector::new(scene, ManualScheduler::new(), SelectorConfig::default());
        let titled = sel.add_entry(1, false, false).unwrap();
        let untitled = sel.add_entry(2, false, false).unwrap();
        let bare = sel.add_entry(3, false, false).unwrap();

        let label = |sel: &HeadlessSelector, id| {
            let bg = *sel.background(id).unwrap();
            sel.scene().label(bg).map(str::to_owned)
        };
        assert_eq!(label(&sel, titled).as_deref(), Some("vim"));
        assert_eq!(label(&sel, untitled).as_deref(), Some("Terminal"));
        assert_eq!(label(&sel, bare), None);
        assert!(sel.is_metadata_attached(titled).unwrap());
        assert!(!sel.is_metadata_attached(bare).unwrap());
    }

    #[test]
    fn close_and_refresh_metadata() {
        let mut scene = RecordingScene::new();
        scene.set_metadata(1, EntryMetadata::titled("htop"));
        let mut sel = Selector::new(scene, ManualScheduler::new(), SelectorConfig::default());
        let id = sel.add_entry(1, false, false).unwrap();
        let bg = *sel.background(id).unwrap();

        sel.close_entry(id).unwrap();
        assert!(!sel.is_metadata_attached(id).unwrap());

        sel.scene_mut().set_metadata(1, EntryMetadata::titled("top"));
        sel.refresh_entry_metadata(id).unwrap();
        assert!(sel.is_metadata_attached(id).unwrap());
        assert_eq!(sel.scene().label(bg), Some("top"));
    }

    #[test]
    fn refresh_after_deletion_detaches() {
        let mut scene = RecordingScene::new();
        scene.set_metadata(1, EntryMetadata::titled("htop"));
        let mut sel = Selector::new(scene, ManualScheduler::new(), SelectorConfig::default());
        let id = sel.add_entry(1, false, false).unwrap();
        let bg = *sel.background(id).unwrap();

        sel.content_deleted(id).unwrap();
        assert_eq!(sel.content(id).unwrap(), None);
        sel.refresh_entry_metadata(id).unwrap();
        assert!(!sel.is_metadata_attached(id).unwrap());
        assert_eq!(sel.scene().label(bg), Some("htop"));
    }

    #[test]
    fn set_entry_title_overrides_label() {
        let mut sel = selector();
        let id = sel.add_entry(1, false, false).unwrap();
        sel.set_entry_title(id, "build").unwrap();
        let bg = *sel.background(id).unwrap();
        assert_eq!(sel.scene().label(bg), Some("build"));
    }

    #[test]
    fn unknown_entry_errors() {
        let mut sel = selector();
        sel.add_entry(1, false, false).unwrap();
        let bogus = EntryId::from_index(4);
        assert_eq!(
            sel.set_entry_title(bogus, "x"),
            Err(SelectorError::UnknownEntry(bogus))
        );
        assert!(sel.close_entry(bogus).is_err());
        assert!(sel.refresh_entry_metadata(bogus).is_err());
        assert!(sel.content_deleted(bogus).is_err());
        assert!(sel.cell_rect(bogus).is_err());
    }

    #[test]
    fn unchanged_geometry_is_ignored() {
        let mut sel = selector();
        sel.add_entry(1, true, false).unwrap();
        sel.set_geometry(Rect::from_size(800, 600));
        sel.scene_mut().take_ops();
        sel.set_geometry(Rect::from_size(800, 600));
        assert!(sel.scene().ops().is_empty());
        sel.set_geometry(Rect::new(10, 0, 800, 600));
        assert!(!sel.scene().ops().is_empty());
    }

    #[test]
    fn start_places_reveals_and_raises_selection() {
        let mut sel = selector();
        let a = sel.add_entry(1, true, false).unwrap();
        sel.add_entry(2, false, false).unwrap();
        sel.set_geometry(Rect::from_size(800, 600));
        sel.scene_mut().take_ops();
        sel.start();
        let bg = *sel.background(a).unwrap();
        let ops = sel.scene().ops();
        assert!(ops.contains(&SceneOp::Reveal));
        assert_eq!(ops.last(), Some(&SceneOp::Raise(bg)));
        assert_eq!(sel.cell_rect(a).unwrap(), Rect::from_size(800, 600));
    }

    #[test]
    fn drop_destroys_backgrounds() {
        let mut sel = selector();
        sel.add_entry(1, false, false).unwrap();
        sel.add_entry(2, false, false).unwrap();
        let destroyed = sel.scene().destroyed_handle();
        drop(sel);
        assert_eq!(
            *destroyed.borrow(),
            vec![BackgroundId(0), BackgroundId(1)]
        );
    }

    #[test]
    fn drain_events_empties_queue() {
        let mut sel = selector();
        sel.push_event(SelectorEvent::Clicked);
        assert_eq!(sel.drain_events(), vec![SelectorEvent::Clicked]);
        assert!(sel.drain_events().is_empty());
    }
}
