#![forbid(unsafe_code)]

//! Entry storage.
//!
//! Entries are kept in insertion order, which is also grid order and the
//! order every scan (hit testing, navigation, anchor lookup) walks. Entries
//! are never removed while the selector lives; a deleted content only clears
//! its slot, so an [`EntryId`] stays valid for the selector's lifetime.

use bitflags::bitflags;
use selgrid_core::geometry::Rect;
use selgrid_core::warn;

use crate::error::SelectorError;

/// Handle to an entry, issued by [`Selector::add_entry`](crate::Selector::add_entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(usize);

impl EntryId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    /// Position in grid order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

bitflags! {
    /// Independent selection facets of one entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectionFacets: u8 {
        /// The current selection.
        const SELECTED          = 0b0001;
        /// Selected when the selector opened; the pan animation starts here.
        const SELECTED_BEFORE   = 0b0010;
        /// Selected when added. Never changes; `Escape` returns here.
        const SELECTED_ORIGINAL = 0b0100;
        /// Lost the selection while nothing was laid out; its `Unselected`
        /// cue is still owed.
        const WAS_SELECTED      = 0b1000;
    }
}

/// One grid cell's worth of state.
#[derive(Debug)]
pub(crate) struct Entry<C, B> {
    /// `None` once the host reported the content deleted.
    pub content: Option<C>,
    pub background: B,
    pub facets: SelectionFacets,
    /// Where the background was last placed.
    pub cell: Rect,
    /// Whether title lookups are live for this entry.
    pub metadata_attached: bool,
}

impl<C, B> Entry<C, B> {
    pub fn new(content: C, background: B, facets: SelectionFacets) -> Self {
        Self {
            content: Some(content),
            background,
            facets,
            cell: Rect::default(),
            metadata_attached: false,
        }
    }

    #[inline]
    pub fn is_selected(&self) -> bool {
        self.facets.contains(SelectionFacets::SELECTED)
    }
}

#[derive(Debug)]
pub(crate) struct Registry<C, B> {
    entries: Vec<Entry<C, B>>,
}

impl<C, B> Default for Registry<C, B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<C, B> Registry<C, B> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Make room for one more entry without aborting on allocation failure.
    pub fn reserve_one(&mut self) -> Result<(), SelectorError> {
        self.entries.try_reserve(1)?;
        Ok(())
    }

    /// Append an entry. Call [`reserve_one`](Self::reserve_one) first.
    pub fn push(&mut self, entry: Entry<C, B>) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: EntryId) -> Result<&Entry<C, B>, SelectorError> {
        self.entries.get(id.0).ok_or_else(|| unknown(id))
    }

    pub fn get_mut(&mut self, id: EntryId) -> Result<&mut Entry<C, B>, SelectorError> {
        self.entries.get_mut(id.0).ok_or_else(|| unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Entry<C, B>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (EntryId(i), e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntryId, &mut Entry<C, B>)> {
        self.entries
            .iter_mut()
            .enumerate()
            .map(|(i, e)| (EntryId(i), e))
    }

    /// First entry in grid order carrying `SELECTED`.
    pub fn selected(&self) -> Option<EntryId> {
        self.first_with(SelectionFacets::SELECTED)
    }

    pub fn first_with(&self, facet: SelectionFacets) -> Option<EntryId> {
        self.entries
            .iter()
            .position(|e| e.facets.contains(facet))
            .map(EntryId)
    }

    pub fn last_with(&self, facet: SelectionFacets) -> Option<EntryId> {
        self.entries
            .iter()
            .rposition(|e| e.facets.contains(facet))
            .map(EntryId)
    }

    /// Entry after `id` in grid order.
    pub fn next(&self, id: EntryId) -> Option<EntryId> {
        let next = id.0.checked_add(1)?;
        (next < self.entries.len()).then_some(EntryId(next))
    }

    /// Entry before `id` in grid order.
    pub fn prev(&self, id: EntryId) -> Option<EntryId> {
        id.0.checked_sub(1).map(EntryId)
    }

    /// First entry whose last placement covers the pixel at `(x, y)`.
    pub fn hit(&self, x: i32, y: i32) -> Option<EntryId> {
        let pixel = Rect::new(x, y, 1, 1);
        self.entries
            .iter()
            .position(|e| e.cell.intersects(&pixel))
            .map(EntryId)
    }

    /// Remove every entry, leaving the registry empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Entry<C, B>> {
        self.entries.drain(..)
    }
}

fn unknown(id: EntryId) -> SelectorError {
    warn!(entry = id.0, "unknown entry");
    SelectorError::UnknownEntry(id)
}
