#![forbid(unsafe_code)]

//! Input router.
//!
//! Turns pointer and key events into selection and zoom commands:
//!
//! | Input | Effect |
//! |-------|--------|
//! | tap on a cell | select it, commit, zoom to 1 |
//! | tap outside every cell | [`SelectorEvent::Clicked`] |
//! | hover (no button held) | pan proportionally to the pointer |
//! | `PageDown` / `Right` | select next entry |
//! | `PageUp` / `Left` | select previous entry |
//! | `Up` / `Down` | select the cell half a row above / below |
//! | `Enter` / `space` | commit, zoom to 1 |
//! | `Escape` | return to the original entry, cancel, zoom to 1 |
//!
//! Rapid navigation autozooms: each command arriving within the autozoom
//! window of the previous one zooms out a step, and the zoom springs back
//! to the baseline once navigation pauses for a full window.

use selgrid_core::event::{Event, KeyCode, MouseButton, MouseEventKind};
use selgrid_core::geometry::{Point, Rect};
use selgrid_core::{debug, trace};

use crate::layout::GridDims;
use crate::registry::{EntryId, SelectionFacets};
use crate::scene::Scene;
use crate::scheduler::{Scheduler, TimerId};
use crate::widget::{Selector, SelectorEvent, WidgetFlags};

/// A key mapped onto what the selector does with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select the entry after the current one.
    Next,
    /// Select the entry before the current one.
    Previous,
    /// Select the cell above.
    Up,
    /// Select the cell below.
    Down,
    /// Accept the current selection.
    Commit,
    /// Return to the original selection and leave.
    Cancel,
}

impl Command {
    /// The command bound to `code`, if any.
    #[must_use]
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::PageDown | KeyCode::Right => Some(Self::Next),
            KeyCode::PageUp | KeyCode::Left => Some(Self::Previous),
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Enter | KeyCode::Char(' ') => Some(Self::Commit),
            KeyCode::Escape => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl<S: Scene, T: Scheduler> Selector<S, T> {
    /// Route a canonical event. Returns whether the selector consumed it.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) if key.is_down() => self.key_down(key.code),
            Event::Key(_) => false,
            Event::Mouse(mouse) => {
                let pos = Point::new(mouse.x, mouse.y);
                match mouse.kind {
                    MouseEventKind::Down(button) => {
                        self.pointer_down(pos, button);
                        true
                    }
                    MouseEventKind::Up(_) => {
                        self.pointer_up(pos);
                        true
                    }
                    MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                        self.pointer_move(pos);
                        true
                    }
                    MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => false,
                }
            }
            Event::Resize { width, height } => {
                let rect = Rect::new(self.viewport.x, self.viewport.y, *width, *height);
                self.set_geometry(rect);
                true
            }
            Event::Focus(_) => false,
        }
    }

    /// Pointer pressed at `pos`.
    pub fn pointer_down(&mut self, pos: Point, button: MouseButton) {
        if self.flags.contains(WidgetFlags::EXIT_ON_SELECT)
            || self.press.is_some()
            || !button.is_primary()
        {
            return;
        }
        self.press = Some(pos);
    }

    /// Pointer released at `pos`. Any button ends a tracked press.
    pub fn pointer_up(&mut self, pos: Point) {
        if self.flags.contains(WidgetFlags::EXIT_ON_SELECT) {
            return;
        }
        let Some(down) = self.press.take() else {
            return;
        };
        let (dx, dy) = pos.abs_delta(down);
        let tolerance = self.config.tap_tolerance;
        if dx > tolerance || dy > tolerance {
            return;
        }

        match self.entries.hit(pos.x, pos.y) {
            Some(entry) => {
                debug!(entry = entry.index(), "tap selected entry");
                if self.set_selected(entry, false).is_ok() {
                    self.commit();
                }
            }
            None => self.push_event(SelectorEvent::Clicked),
        }
    }

    /// Pointer moved to `pos`.
    pub fn pointer_move(&mut self, pos: Point) {
        if self.flags.intersects(
            WidgetFlags::EXIT_ME
                | WidgetFlags::EXIT_NOW
                | WidgetFlags::SELECT_ME
                | WidgetFlags::EXIT_ON_SELECT,
        ) {
            return;
        }
        if self.press.is_some() {
            return;
        }
        let view = self.viewport;
        if view.is_empty() {
            return;
        }

        let dims = GridDims::for_count(self.entries.len());
        let cell = view.size().scale(self.motion.zoom);
        self.begin_transition(self.config.hover_pan_duration);
        self.motion.pan_to = Point::new(
            hover_target(pos.x.saturating_sub(view.x), dims.cols, cell.width, view.width),
            hover_target(pos.y.saturating_sub(view.y), dims.rows, cell.height, view.height),
        );
        self.flags.insert(WidgetFlags::DIRECT_PAN);
    }

    /// Key pressed. Returns whether the key is bound.
    pub fn key_down(&mut self, code: KeyCode) -> bool {
        let Some(command) = Command::from_key(code) else {
            return false;
        };
        self.run_command(command);
        true
    }

    /// Execute a command as if its key had been pressed.
    pub fn run_command(&mut self, command: Command) {
        trace!(?command, "command");
        match command {
            Command::Next | Command::Previous | Command::Up | Command::Down => {
                let Some(target) = self.navigation_target(command) else {
                    return;
                };
                if self.set_selected(target, false).is_ok() {
                    self.flags.remove(WidgetFlags::EXIT_NOW);
                    self.autozoom();
                }
            }
            Command::Commit => self.commit(),
            Command::Cancel => {
                if let Some(original) = self.entries.last_with(SelectionFacets::SELECTED_ORIGINAL) {
                    self.set_selected(original, false).ok();
                }
                self.flags.remove(WidgetFlags::SELECT_ME);
                self.flags.insert(WidgetFlags::EXIT_ME);
                self.finish();
            }
        }
    }

    fn commit(&mut self) {
        self.flags.insert(WidgetFlags::SELECT_ME);
        self.flags.remove(WidgetFlags::EXIT_ME);
        self.finish();
    }

    fn finish(&mut self) {
        self.cancel_autozoom();
        self.push_event(SelectorEvent::Ending);
        self.zoom_to(1.0);
    }

    fn navigation_target(&self, command: Command) -> Option<EntryId> {
        let current = self.entries.selected()?;
        match command {
            Command::Next => self.entries.next(current),
            Command::Previous => self.entries.prev(current),
            Command::Up | Command::Down => {
                let cell = self.entries.get(current).ok()?.cell;
                let x = cell.x.saturating_add(cell.width / 2);
                let y = if command == Command::Up {
                    cell.y.saturating_sub(cell.height / 2)
                } else {
                    cell.bottom().saturating_add(cell.height / 2)
                };
                self.entries.hit(x, y)
            }
            Command::Commit | Command::Cancel => None,
        }
    }

    fn autozoom(&mut self) {
        let now = self.scheduler.now();
        let window = self.config.autozoom_window;
        if let Some(last) = self.last_command
            && now.saturating_duration_since(last) < window
        {
            self.zoom_to(self.motion.zoom * self.config.autozoom_factor);
        }
        self.last_command = Some(now);
        self.cancel_autozoom();
        let id = self.scheduler.start_timer(window);
        if let Some(stale) = self.autozoom_timer.arm(id) {
            self.scheduler.cancel_timer(stale);
        }
    }

    pub(crate) fn cancel_autozoom(&mut self) {
        if let Some(id) = self.autozoom_timer.take() {
            self.scheduler.cancel_timer(id);
        }
    }

    /// Timer callback. Restores the baseline zoom when the autozoom timer
    /// expires; other ids are ignored.
    pub fn on_timer(&mut self, id: TimerId) {
        if !self.autozoom_timer.matches(id) {
            trace!(timer = id.0, "stale timer ignored");
            return;
        }
        self.autozoom_timer.take();
        debug!(zoom = self.baseline_zoom, "autozoom restore");
        self.zoom_to(self.baseline_zoom);
    }
}

/// Pan target for a pointer at `offset` along an axis: the pointer's
/// fraction of the viewport applied to the span between first and last
/// cell anchors. Not clamped.
fn hover_target(offset: i32, count: i32, cell: i32, viewport: i32) -> i32 {
    let span = i64::from(count - 1) * i64::from(cell);
    let target = i64::from(offset) * span / i64::from(viewport);
    target.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
