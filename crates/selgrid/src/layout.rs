#![forbid(unsafe_code)]

//! Grid layout engine.
//!
//! Maps an entry count, a viewport and a zoom factor onto a near-square
//! grid of equally sized cells, and a requested pan offset onto the offset
//! that is actually rendered.
//!
//! # Geometry
//!
//! ```text
//! cols = max(1, floor(sqrt(n)))        rows = max(1, ceil(n / cols))
//! cell = viewport * zoom (truncated)
//! cell i at (origin + (i % cols, i / cols) * cell - pan)
//! ```
//!
//! Pan offsets are expressed in scaled-cell pixels: the anchor of entry `i`
//! is its column and row multiplied by the current cell size, so panning to
//! an anchor puts that cell at the viewport origin before clamping.
//!
//! # Clamping
//!
//! Per axis, with `E = count * cell` the grid extent and `V` the viewport:
//!
//! - `E <= V` or `E <= cell`: the grid is centred, `pan = (E - V) / 2`.
//! - otherwise `pan' = pan - pan * (V - cell) / (E - cell)`, which maps the
//!   anchor range `[0, E - cell]` onto `[0, E - V]` so that the outermost
//!   cells end flush with the viewport edge instead of exposing empty space.
//!
//! All arithmetic is integer and truncates towards zero.

use selgrid_core::geometry::{Point, Rect, Size};
use selgrid_core::trace_span;

use crate::registry::SelectionFacets;
use crate::scene::Scene;
use crate::scheduler::Scheduler;
use crate::widget::{Selector, WidgetFlags};

/// Column and row count of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    /// Columns, at least 1.
    pub cols: i32,
    /// Rows, at least 1.
    pub rows: i32,
}

impl GridDims {
    /// Dimensions for `count` entries.
    #[must_use]
    pub fn for_count(count: usize) -> Self {
        let cols = count.isqrt().max(1);
        let rows = count.div_ceil(cols).max(1);
        Self {
            cols: saturating_i32(cols),
            rows: saturating_i32(rows),
        }
    }

    /// Number of cells the grid holds.
    #[must_use]
    pub fn capacity(&self) -> usize {
        usize::try_from(i64::from(self.cols) * i64::from(self.rows)).unwrap_or(usize::MAX)
    }

    /// Column and row of entry `index`, row-major.
    #[must_use]
    pub fn position(&self, index: usize) -> Point {
        let cols = usize::try_from(self.cols).unwrap_or(1).max(1);
        Point::new(saturating_i32(index % cols), saturating_i32(index / cols))
    }
}

fn saturating_i32(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn clamp_to_i32(v: i64) -> i32 {
    // Lossless after the clamp.
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Clamp one axis of a pan offset.
///
/// `count` is the number of cells along the axis, `cell` the cell extent and
/// `viewport` the visible extent. Callers only clamp when both `count` and
/// `cell` are positive; otherwise `pan` comes back unchanged.
#[must_use]
pub fn clamp_axis(pan: i32, count: i32, cell: i32, viewport: i32) -> i32 {
    if count <= 0 || cell <= 0 {
        return pan;
    }
    let cell = i64::from(cell);
    let viewport = i64::from(viewport);
    let extent = i64::from(count) * cell;
    if extent <= viewport || extent <= cell {
        return clamp_to_i32((extent - viewport) / 2);
    }
    let pan = i64::from(pan);
    clamp_to_i32(pan - (pan * (viewport - cell)) / (extent - cell))
}

/// Grid geometry for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Column and row count.
    pub dims: GridDims,
    /// Viewport the grid is laid out in.
    pub viewport: Rect,
    /// Size of every cell.
    pub cell: Size,
}

impl GridLayout {
    /// Lay out `count` entries in `viewport` at `zoom`.
    #[must_use]
    pub fn new(count: usize, viewport: Rect, zoom: f64) -> Self {
        Self {
            dims: GridDims::for_count(count),
            viewport,
            cell: viewport.size().scale(zoom),
        }
    }

    /// Unclamped pan offset that puts entry `index` at the viewport origin.
    #[must_use]
    pub fn anchor(&self, index: usize) -> Point {
        let pos = self.dims.position(index);
        Point::new(
            pos.x.saturating_mul(self.cell.width),
            pos.y.saturating_mul(self.cell.height),
        )
    }

    /// The pan offset actually rendered for a requested `pan`.
    ///
    /// With an empty cell nothing is clamped.
    #[must_use]
    pub fn clamp_pan(&self, pan: Point) -> Point {
        if self.cell.is_empty() {
            return pan;
        }
        Point::new(
            clamp_axis(pan.x, self.dims.cols, self.cell.width, self.viewport.width),
            clamp_axis(pan.y, self.dims.rows, self.cell.height, self.viewport.height),
        )
    }

    /// Placement of entry `index` for an already clamped `pan`.
    #[must_use]
    pub fn cell_rect(&self, index: usize, pan: Point) -> Rect {
        let anchor = self.anchor(index);
        Rect::new(
            self.viewport.x.saturating_add(anchor.x).saturating_sub(pan.x),
            self.viewport.y.saturating_add(anchor.y).saturating_sub(pan.y),
            self.cell.width,
            self.cell.height,
        )
    }
}

impl<S: Scene, T: Scheduler> Selector<S, T> {
    /// Recompute pan anchors, place every background, and flush any owed
    /// selection cues.
    pub(crate) fn relayout(&mut self) {
        let span = trace_span!("selgrid.layout", entries = self.entries.len());
        let _guard = span.enter();

        let grid = GridLayout::new(self.entries.len(), self.viewport, self.motion.zoom);

        if !self.flags.contains(WidgetFlags::DIRECT_PAN) {
            // An exit-on-select hop that has not committed yet stays on the
            // entry the selector opened with.
            let hold_before = self.flags.contains(WidgetFlags::EXIT_ON_SELECT)
                && !self.flags.contains(WidgetFlags::EXIT_NOW);
            for (id, entry) in self.entries.iter() {
                let before = entry.facets.contains(SelectionFacets::SELECTED_BEFORE);
                if before {
                    self.motion.pan_from = grid.anchor(id.index());
                }
                let is_target = if hold_before {
                    before
                } else {
                    entry.is_selected()
                };
                if is_target {
                    self.motion.pan_to = grid.anchor(id.index());
                }
            }
        }

        self.motion.pan = self
            .motion
            .pan_from
            .lerp(self.motion.pan_to, self.motion.interp);
        let pan = grid.clamp_pan(self.motion.pan);
        self.rendered_pan = pan;

        for (id, entry) in self.entries.iter_mut() {
            let rect = grid.cell_rect(id.index(), pan);
            entry.cell = rect;
            self.scene.place(&entry.background, rect);
        }

        if !self.laid_out.is_empty() && self.flags.contains(WidgetFlags::PENDING_VISUALS) {
            self.flush_pending_visuals();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dims_table() {
        let cases = [
            (0, 1, 1),
            (1, 1, 1),
            (2, 1, 2),
            (3, 1, 3),
            (4, 2, 2),
            (5, 2, 3),
            (8, 2, 4),
            (9, 3, 3),
            (10, 3, 4),
            (17, 4, 5),
        ];
        for (n, cols, rows) in cases {
            assert_eq!(GridDims::for_count(n), GridDims { cols, rows }, "n={n}");
        }
    }

    #[test]
    fn position_is_row_major() {
        let dims = GridDims::for_count(5);
        assert_eq!(dims.position(0), Point::new(0, 0));
        assert_eq!(dims.position(1), Point::new(1, 0));
        assert_eq!(dims.position(2), Point::new(0, 1));
        assert_eq!(dims.position(4), Point::new(0, 2));
    }

    #[test]
    fn centred_when_grid_fits() {
        // Two half-size cells exactly fill the viewport.
        assert_eq!(clamp_axis(123, 2, 400, 800), 0);
        // Smaller grid shifts right by half the slack.
        assert_eq!(clamp_axis(123, 2, 300, 800), -100);
    }

    #[test]
    fn centred_when_single_cell_overflows() {
        // Zoomed past 1 with a single column: no proportional room to pan.
        assert_eq!(clamp_axis(0, 1, 1600, 800), 400);
        assert_eq!(clamp_axis(999, 1, 1600, 800), 400);
    }

    #[test]
    fn proportional_maps_anchor_range_to_edges() {
        // Three 400px cells in an 800px viewport.
        assert_eq!(clamp_axis(0, 3, 400, 800), 0);
        assert_eq!(clamp_axis(400, 3, 400, 800), 200);
        assert_eq!(clamp_axis(800, 3, 400, 800), 400);
    }

    #[test]
    fn proportional_when_zoomed_in() {
        // Cells larger than the viewport: the last anchor still lands flush.
        assert_eq!(clamp_axis(2000, 3, 1000, 800), 2200);
        assert_eq!(clamp_axis(0, 3, 1000, 800), 0);
    }

    #[test]
    fn clamp_skipped_for_empty_cells() {
        let grid = GridLayout::new(4, Rect::new(0, 0, 800, 600), 0.0);
        assert!(grid.cell.is_empty());
        assert_eq!(grid.clamp_pan(Point::new(17, -3)), Point::new(17, -3));
    }

    #[test]
    fn cell_rects_at_half_zoom() {
        let grid = GridLayout::new(4, Rect::new(10, 20, 800, 600), 0.5);
        assert_eq!(grid.cell, Size::new(400, 300));
        let pan = grid.clamp_pan(Point::new(400, 300));
        // 2x2 grid of half cells fills the viewport: centred at zero.
        assert_eq!(pan, Point::ZERO);
        assert_eq!(grid.cell_rect(0, pan), Rect::new(10, 20, 400, 300));
        assert_eq!(grid.cell_rect(3, pan), Rect::new(410, 320, 400, 300));
    }

    #[test]
    fn anchors_scale_with_cell() {
        let grid = GridLayout::new(9, Rect::from_size(900, 600), 0.5);
        assert_eq!(grid.anchor(0), Point::ZERO);
        assert_eq!(grid.anchor(4), Point::new(450, 300));
        assert_eq!(grid.anchor(8), Point::new(900, 600));
    }

    #[test]
    fn full_zoom_selected_cell_fills_viewport() {
        let grid = GridLayout::new(4, Rect::from_size(800, 600), 1.0);
        let pan = grid.clamp_pan(grid.anchor(3));
        assert_eq!(grid.cell_rect(3, pan), Rect::from_size(800, 600));
    }
}
