//! Scatter Plot - hours per day against anxiety, with a rectangular brush
//!
//! Brush end publishes the ids under the rectangle on the brush signal;
//! clearing the brush publishes "no filter".

use eframe::egui;
use egui::{Color32, PointerButton, Stroke};
use egui_plot::{Plot, PlotPoints, Points, Polygon};
use tracing::debug;

use crate::config::ChartSize;
use crate::scale::extent;
use crate::signal::{BrushSignal, Selection};
use crate::state::{BrushRect, ScatterAction, ScatterState};
use crate::survey::ScatterPoint;

const POINT_COLOR: Color32 = Color32::from_rgb(0x69, 0xb3, 0xa2);
const SELECTED_COLOR: Color32 = Color32::from_rgb(0xe4, 0x57, 0x56);
const BRUSH_FILL: Color32 = Color32::from_rgba_premultiplied(40, 40, 40, 40);

/// Ids of the points inside `rect`
pub fn brush_selection(points: &[ScatterPoint], rect: &BrushRect) -> Selection {
    points
        .iter()
        .filter(|p| rect.contains(p.hours, p.anxiety))
        .map(|p| p.id)
        .collect()
}

/// Brush corner for a new drag: the press point, else the current pointer
fn brush_anchor(pressed_at: Option<[f64; 2]>, pointer: Option<[f64; 2]>) -> Option<[f64; 2]> {
    pressed_at.or(pointer)
}

/// Observed (hours, anxiety) extents
pub fn domains(points: &[ScatterPoint]) -> ((f64, f64), (f64, f64)) {
    (
        extent(points.iter().map(|p| p.hours)).unwrap_or((0.0, 1.0)),
        extent(points.iter().map(|p| p.anxiety)).unwrap_or((0.0, 1.0)),
    )
}

pub struct ScatterPlot {
    size: ChartSize,
    points: Vec<ScatterPoint>,
    domains: ((f64, f64), (f64, f64)),
    state: ScatterState,
    signal: BrushSignal,
}

impl ScatterPlot {
    pub fn new(size: ChartSize, signal: BrushSignal) -> Self {
        Self {
            size,
            points: Vec::new(),
            domains: ((0.0, 1.0), (0.0, 1.0)),
            state: ScatterState::default(),
            signal,
        }
    }

    pub fn set_data(&mut self, points: Vec<ScatterPoint>) {
        self.domains = domains(&points);
        debug!("Scatter domains: hours {:?}, anxiety {:?}", self.domains.0, self.domains.1);
        self.points = points;
        self.state = ScatterState::default();
    }

    #[cfg(test)]
    pub fn brush(&self) -> Option<BrushRect> {
        self.state.brush
    }

    pub fn dispatch(&mut self, action: ScatterAction) {
        self.state = std::mem::take(&mut self.state).reduce(action);
        if matches!(action, ScatterAction::DragEnd | ScatterAction::Clear) {
            let selection = match &self.state.brush {
                Some(rect) => brush_selection(&self.points, rect),
                None => Selection::All,
            };
            self.signal.publish(selection);
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let ((x0, x1), (y0, y1)) = self.domains;
        let brush = self.state.brush;

        let (inside, outside): (Vec<[f64; 2]>, Vec<[f64; 2]>) = self
            .points
            .iter()
            .filter(|p| p.hours.is_finite() && p.anxiety.is_finite())
            .map(|p| [p.hours, p.anxiety])
            .partition(|p| brush.is_some_and(|b| b.contains(p[0], p[1])));

        let plot = Plot::new("scatter_plot")
            .width(self.size.width)
            .height(self.size.height)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show_grid(false)
            .set_margin_fraction(egui::Vec2::ZERO)
            .x_axis_label("Hours per Day")
            .y_axis_label("Anxiety (0-10)")
            .include_x(x0)
            .include_x(x1)
            .include_y(y0)
            .include_y(y1);

        let response = plot.show(ui, |plot_ui| {
            plot_ui.points(Points::new(PlotPoints::new(outside)).radius(3.0).color(POINT_COLOR));
            plot_ui.points(Points::new(PlotPoints::new(inside)).radius(3.0).color(SELECTED_COLOR));
            if let Some(b) = brush {
                let corners = vec![
                    [b.min[0], b.min[1]],
                    [b.max[0], b.min[1]],
                    [b.max[0], b.max[1]],
                    [b.min[0], b.max[1]],
                ];
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(corners))
                        .fill_color(BRUSH_FILL)
                        .stroke(Stroke::new(1.0, Color32::DARK_GRAY)),
                );
            }
            let pressed_at = plot_ui
                .ctx()
                .input(|i| i.pointer.press_origin())
                .map(|pos| plot_ui.transform().value_from_position(pos));
            (plot_ui.pointer_coordinate(), pressed_at)
        });

        let (pointer, pressed_at) = response.inner;
        let pointer = pointer.map(|p| [p.x, p.y]);
        let pressed_at = pressed_at.map(|p| [p.x, p.y]);
        let r = &response.response;
        if r.drag_started_by(PointerButton::Primary) {
            if let Some(at) = brush_anchor(pressed_at, pointer) {
                self.dispatch(ScatterAction::DragStart(at));
            }
        } else if r.dragged_by(PointerButton::Primary) && self.state.is_dragging() {
            if let Some(at) = pointer {
                self.dispatch(ScatterAction::DragTo(at));
            }
        }
        if r.drag_stopped() && self.state.is_dragging() {
            self.dispatch(ScatterAction::DragEnd);
        } else if r.clicked() {
            self.dispatch(ScatterAction::Clear);
        }
    }
}
