#![forbid(unsafe_code)]

//! Selection state machine.
//!
//! [`Selector::set_selected`] is the only place the `SELECTED` facet moves
//! between entries, so at most one entry holds it after any public call.
//!
//! Selection cues need a laid-out selector. While the selector has no size
//! yet, an entry losing the selection is marked `WAS_SELECTED` and the cues
//! are owed; the next layout pass with a nonzero size pays them.

use selgrid_core::debug;

use crate::error::SelectorError;
use crate::registry::{EntryId, SelectionFacets};
use crate::scene::{Cue, Scene};
use crate::scheduler::Scheduler;
use crate::widget::{Selector, WidgetFlags};

impl<S: Scene, T: Scheduler> Selector<S, T> {
    /// Make `target` the selection and animate the grid towards it.
    ///
    /// Any other selected entry loses the selection, which also clears a
    /// pending commit or cancel. Unless `keep_before` is set, every entry
    /// forgets `SELECTED_BEFORE`, so the pan starts from where the grid
    /// currently is.
    pub fn set_selected(&mut self, target: EntryId, keep_before: bool) -> Result<(), SelectorError> {
        self.entries.get(target)?;
        let visible = !self.laid_out.is_empty();

        for (id, entry) in self.entries.iter_mut() {
            if id != target && entry.is_selected() {
                if visible {
                    self.scene.emit_cue(&entry.background, Cue::Unselected);
                } else {
                    entry.facets.insert(SelectionFacets::WAS_SELECTED);
                    self.flags.insert(WidgetFlags::PENDING_VISUALS);
                }
                entry.facets.remove(SelectionFacets::SELECTED);
                self.flags
                    .remove(WidgetFlags::SELECT_ME | WidgetFlags::EXIT_ME);
            }
            if !keep_before {
                entry.facets.remove(SelectionFacets::SELECTED_BEFORE);
            }
        }

        let entry = self.entries.get_mut(target)?;
        entry.facets.remove(SelectionFacets::WAS_SELECTED);
        entry.facets.insert(SelectionFacets::SELECTED);
        if visible {
            self.scene.emit_cue(&entry.background, Cue::Selected);
        } else {
            self.flags.insert(WidgetFlags::PENDING_VISUALS);
        }
        self.scene.raise(&entry.background);
        debug!(entry = target.index(), keep_before, "selection changed");

        self.flags.remove(WidgetFlags::DIRECT_PAN);
        self.begin_transition(self.config.transition);
        Ok(())
    }

    /// Pay owed selection cues.
    pub(crate) fn flush_pending_visuals(&mut self) {
        self.flags.remove(WidgetFlags::PENDING_VISUALS);
        for (_, entry) in self.entries.iter_mut() {
            let was = entry.facets.contains(SelectionFacets::WAS_SELECTED);
            let is = entry.is_selected();
            if is && !was {
                self.scene.emit_cue(&entry.background, Cue::Selected);
            } else if was && !is {
                self.scene.emit_cue(&entry.background, Cue::Unselected);
            }
            entry.facets.remove(SelectionFacets::WAS_SELECTED);
        }
    }

    /// Currently selected entry.
    #[must_use]
    pub fn selected(&self) -> Option<EntryId> {
        self.entries.selected()
    }

    /// Entry `Escape` returns to: the last one added as selected.
    #[must_use]
    pub fn original_selection(&self) -> Option<EntryId> {
        self.entries.last_with(SelectionFacets::SELECTED_ORIGINAL)
    }

    /// Selection facets of `entry`.
    pub fn facets(&self, entry: EntryId) -> Result<SelectionFacets, SelectorError> {
        Ok(self.entries.get(entry)?.facets)
    }
}

#[cfg(test)]
mod tests {
    use selgrid_core::geometry::Rect;

    use crate::config::SelectorConfig;
    use crate::headless::{HeadlessSelector, ManualScheduler, RecordingScene};
    use crate::registry::{EntryId, SelectionFacets};
    use crate::scene::Cue;
    use crate::widget::{Selector, SelectorEvent};

    fn selector(n: u32, selected: u32) -> HeadlessSelector {
        let mut sel = Selector::new(
            RecordingScene::new(),
            ManualScheduler::new(),
            SelectorConfig::default(),
        );
        for i in 0..n {
            sel.add_entry(i, i == selected, false).unwrap();
        }
        sel
    }

    fn id(i: usize) -> EntryId {
        EntryId::from_index(i)
    }

    #[test]
    fn moves_the_single_selection() {
        let mut sel = selector(3, 0);
        sel.set_selected(id(2), false).unwrap();
        assert_eq!(sel.selected(), Some(id(2)));
        assert!(!sel.facets(id(0)).unwrap().contains(SelectionFacets::SELECTED));
    }

    #[test]
    fn clears_before_unless_kept() {
        let mut sel = selector(3, 1);
        sel.set_selected(id(2), true).unwrap();
        assert!(
            sel.facets(id(1))
                .unwrap()
                .contains(SelectionFacets::SELECTED_BEFORE)
        );
        sel.set_selected(id(0), false).unwrap();
        for i in 0..3 {
            assert!(
                !sel.facets(id(i))
                    .unwrap()
                    .contains(SelectionFacets::SELECTED_BEFORE)
            );
        }
        assert!(
            sel.facets(id(1))
                .unwrap()
                .contains(SelectionFacets::SELECTED_ORIGINAL)
        );
    }

    #[test]
    fn unknown_target_changes_nothing() {
        let mut sel = selector(2, 0);
        let bogus = id(9);
        assert!(sel.set_selected(bogus, false).is_err());
        assert_eq!(sel.selected(), Some(id(0)));
        assert!(!sel.scheduler().has_live_animator());
    }

    #[test]
    fn cues_deferred_until_laid_out() {
        let mut sel = selector(2, 0);
        sel.scene_mut().take_ops();
        sel.set_selected(id(1), false).unwrap();
        assert!(sel.scene().cues().is_empty());
        assert!(
            sel.facets(id(0))
                .unwrap()
                .contains(SelectionFacets::WAS_SELECTED)
        );

        sel.set_geometry(Rect::from_size(800, 600));
        let cues = sel.scene().cues();
        assert!(cues.contains(&(sel.background_of(id(1)).unwrap(), Cue::Selected)));
        assert!(cues.contains(&(sel.background_of(id(0)).unwrap(), Cue::Unselected)));
        assert_eq!(cues.len(), 2);

        // Paid once only.
        sel.scene_mut().take_ops();
        sel.set_geometry(Rect::from_size(640, 480));
        assert!(sel.scene().cues().is_empty());
    }

    #[test]
    fn deferred_unselect_is_paid_once_across_resizes() {
        let mut sel = selector(3, 0);
        sel.set_selected(id(1), false).unwrap();
        sel.set_geometry(Rect::from_size(800, 600));
        assert!(
            !sel.facets(id(0))
                .unwrap()
                .contains(SelectionFacets::WAS_SELECTED)
        );

        sel.set_geometry(Rect::from_size(0, 0));
        sel.set_selected(id(2), false).unwrap();
        sel.scene_mut().take_ops();
        sel.set_geometry(Rect::from_size(800, 600));

        let bg1 = sel.background_of(id(1)).unwrap();
        let bg2 = sel.background_of(id(2)).unwrap();
        assert_eq!(
            sel.scene().cues(),
            vec![(bg1, Cue::Unselected), (bg2, Cue::Selected)]
        );
        for i in 0..3 {
            assert!(
                !sel.facets(id(i))
                    .unwrap()
                    .contains(SelectionFacets::WAS_SELECTED)
            );
        }
    }

    #[test]
    fn cues_immediate_when_laid_out() {
        let mut sel = selector(2, 0);
        sel.set_geometry(Rect::from_size(800, 600));
        sel.scene_mut().take_ops();
        sel.set_selected(id(1), false).unwrap();
        let bg0 = sel.background_of(id(0)).unwrap();
        let bg1 = sel.background_of(id(1)).unwrap();
        assert_eq!(
            sel.scene().cues(),
            vec![(bg0, Cue::Unselected), (bg1, Cue::Selected)]
        );
        assert_eq!(sel.scene().top(), Some(bg1));
    }

    #[test]
    fn reselecting_keeps_pending_commit() {
        let mut sel = selector(2, 0);
        sel.set_geometry(Rect::from_size(800, 600));
        sel.key_down(selgrid_core::event::KeyCode::Enter);
        // Same entry again: nothing is unselected, so the commit survives.
        sel.set_selected(id(0), false).unwrap();
        sel.settle();
        assert_eq!(sel.drain_events(), vec![
            SelectorEvent::Ending,
            SelectorEvent::Selected(id(0))
        ]);
    }

    #[test]
    fn selecting_another_drops_pending_commit() {
        let mut sel = selector(2, 0);
        sel.set_geometry(Rect::from_size(800, 600));
        sel.key_down(selgrid_core::event::KeyCode::Enter);
        sel.set_selected(id(1), false).unwrap();
        sel.settle();
        assert_eq!(sel.drain_events(), vec![SelectorEvent::Ending]);
    }
}
