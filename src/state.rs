//! UI State - transient per-chart view state with pure transitions
//!
//! Nothing here touches egui. Charts translate input events into actions and
//! fold them through `reduce`, so every interaction is testable headless.

use crate::signal::Selection;
use crate::survey::{Dimension, RowId};

/// Bar ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortMode {
    /// Descending by respondent count
    #[default]
    Count,
    /// Ascending by genre name
    Alpha,
}

impl SortMode {
    pub fn toggled(self) -> Self {
        match self {
            SortMode::Count => SortMode::Alpha,
            SortMode::Alpha => SortMode::Count,
        }
    }

    /// Button text: names the mode a click switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            SortMode::Count => "Sort A-Z",
            SortMode::Alpha => "Sort by count",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarState {
    pub sort: SortMode,
    pub hovered: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BarAction {
    ToggleSort,
    Hover(Option<String>),
}

impl BarState {
    pub fn reduce(mut self, action: BarAction) -> Self {
        match action {
            BarAction::ToggleSort => self.sort = self.sort.toggled(),
            BarAction::Hover(genre) => self.hovered = genre,
        }
        self
    }
}

/// Brushed rectangle in data coordinates, corners normalised
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushRect {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl BrushRect {
    pub fn from_corners(a: [f64; 2], b: [f64; 2]) -> Self {
        Self {
            min: [a[0].min(b[0]), a[1].min(b[1])],
            max: [a[0].max(b[0]), a[1].max(b[1])],
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }

    pub fn is_empty(&self) -> bool {
        self.min[0] >= self.max[0] || self.min[1] >= self.max[1]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterState {
    pub brush: Option<BrushRect>,
    drag_origin: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScatterAction {
    DragStart([f64; 2]),
    DragTo([f64; 2]),
    /// Brush end; a zero-area brush clears
    DragEnd,
    Clear,
}

impl ScatterState {
    pub fn reduce(mut self, action: ScatterAction) -> Self {
        match action {
            ScatterAction::DragStart(at) => {
                self.drag_origin = Some(at);
                self.brush = Some(BrushRect::from_corners(at, at));
            }
            ScatterAction::DragTo(at) => {
                if let Some(origin) = self.drag_origin {
                    self.brush = Some(BrushRect::from_corners(origin, at));
                }
            }
            ScatterAction::DragEnd => {
                self.drag_origin = None;
                if self.brush.is_some_and(|b| b.is_empty()) {
                    self.brush = None;
                }
            }
            ScatterAction::Clear => {
                self.drag_origin = None;
                self.brush = None;
            }
        }
        self
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParallelState {
    pub selection: Selection,
    pub active_category: Option<String>,
    pub highlight: Option<Dimension>,
    pub hovered_line: Option<RowId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParallelAction {
    Brushed(Selection),
    /// Legend click; replaces any previous category
    PickCategory(String),
    Reset,
    Highlight(Option<Dimension>),
    HoverLine(Option<RowId>),
}

impl ParallelState {
    pub fn reduce(mut self, action: ParallelAction) -> Self {
        match action {
            ParallelAction::Brushed(selection) => self.selection = selection,
            ParallelAction::PickCategory(category) => self.active_category = Some(category),
            ParallelAction::Reset => {
                self.selection = Selection::All;
                self.active_category = None;
            }
            ParallelAction::Highlight(dim) => self.highlight = dim,
            ParallelAction::HoverLine(id) => self.hovered_line = id,
        }
        self
    }

    #[cfg(test)]
    pub fn is_filtered(&self) -> bool {
        self.selection.is_active() || self.active_category.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_toggle_round_trip() {
        let state = BarState::default();
        assert_eq!(state.sort, SortMode::Count);
        let state = state.reduce(BarAction::ToggleSort);
        assert_eq!(state.sort, SortMode::Alpha);
        let state = state.reduce(BarAction::ToggleSort);
        assert_eq!(state.sort, SortMode::Count);
    }

    #[test]
    fn test_brush_drag_normalises_corners() {
        let state = ScatterState::default()
            .reduce(ScatterAction::DragStart([4.0, 8.0]))
            .reduce(ScatterAction::DragTo([1.0, 2.0]))
            .reduce(ScatterAction::DragEnd);
        assert_eq!(
            state.brush,
            Some(BrushRect { min: [1.0, 2.0], max: [4.0, 8.0] })
        );
        assert!(!state.is_dragging());
    }

    #[test]
    fn test_zero_area_brush_clears() {
        let state = ScatterState::default()
            .reduce(ScatterAction::DragStart([4.0, 8.0]))
            .reduce(ScatterAction::DragEnd);
        assert_eq!(state.brush, None);
    }

    #[test]
    fn test_legend_click_overwrites() {
        let state = ParallelState::default()
            .reduce(ParallelAction::PickCategory("Spotify".into()))
            .reduce(ParallelAction::PickCategory("Pandora".into()));
        assert_eq!(state.active_category.as_deref(), Some("Pandora"));

        // re-clicking the same entry keeps it selected
        let state = state.reduce(ParallelAction::PickCategory("Pandora".into()));
        assert_eq!(state.active_category.as_deref(), Some("Pandora"));
    }

    #[test]
    fn test_reset_clears_filters_only() {
        let state = ParallelState::default()
            .reduce(ParallelAction::Brushed([1, 2].into_iter().collect()))
            .reduce(ParallelAction::PickCategory("Spotify".into()))
            .reduce(ParallelAction::Highlight(Some(Dimension::Anxiety)));
        assert!(state.is_filtered());

        let state = state.reduce(ParallelAction::Reset);
        assert_eq!(state.selection, Selection::All);
        assert_eq!(state.active_category, None);
        assert!(!state.is_filtered());
        assert_eq!(state.highlight, Some(Dimension::Anxiety));
    }

    #[test]
    fn test_highlight_set_and_clear() {
        let state = ParallelState::default().reduce(ParallelAction::Highlight(Some(Dimension::Ocd)));
        assert_eq!(state.highlight, Some(Dimension::Ocd));
        let state = state.reduce(ParallelAction::Highlight(None));
        assert_eq!(state.highlight, None);
    }
}
