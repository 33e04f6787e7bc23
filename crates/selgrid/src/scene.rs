#![forbid(unsafe_code)]

//! Host scene graph interface.
//!
//! The selector never draws. Each entry gets a *background*, a themed cell
//! the host creates around the entry's thumbnail content; the selector moves
//! and resizes backgrounds, asks for visual cues, and restacks them. How a
//! cue looks (glow, bell flash, label fade) is up to the host's theme.

use selgrid_core::geometry::Rect;

/// Visual cue requested on an entry background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Entry was selected when the selector opened; shown without animation.
    SelectedStart,
    /// Entry became the selection.
    Selected,
    /// Entry stopped being the selection.
    Unselected,
    /// Entry has an unacknowledged bell.
    Bell,
    /// The bell should also ring audibly or flash, since the host's own
    /// bell is off.
    BellRing,
}

/// What the host knows about an entry's content.
///
/// `None` from [`Scene::metadata`] means the content has no metadata source
/// at all (no label is written); a `title` of `None` means the source exists
/// but has no title yet (the default label is written).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Title to show on the cell label.
    pub title: Option<String>,
}

impl EntryMetadata {
    /// Metadata carrying a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }
}

/// The host scene graph the selector drives.
///
/// Implementations are the selector's only way to affect what is on screen.
/// Every method is called from inside a `&mut Selector` call, never
/// re-entrantly.
pub trait Scene {
    /// Caller-supplied thumbnail content.
    type Content;
    /// Handle to a cell background owned by the selector.
    type Background;

    /// Create a background wrapping `content`.
    fn create_background(&mut self, content: &Self::Content) -> Self::Background;

    /// Destroy a background. Called once per background when the selector
    /// is dropped.
    fn destroy_background(&mut self, background: Self::Background);

    /// Move and resize a background.
    fn place(&mut self, background: &Self::Background, rect: Rect);

    /// Run a visual cue on a background.
    fn emit_cue(&mut self, background: &Self::Background, cue: Cue);

    /// Restack a background directly beneath the input layer.
    fn raise(&mut self, background: &Self::Background);

    /// Set the text label of a background.
    fn set_label(&mut self, background: &Self::Background, label: &str);

    /// Look up the metadata source of `content`.
    fn metadata(&self, content: &Self::Content) -> Option<EntryMetadata>;

    /// Show the selector (its clip and everything beneath it).
    fn reveal(&mut self);
}
