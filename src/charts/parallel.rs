//! Parallel Coordinates Plot
//!
//! Six fixed axes, one polyline per respondent. Scales and colors are built
//! once from the full dataset; filters only change which lines are drawn:
//!
//! 1. start from every tuple
//! 2. keep ids in the brush selection, if one is active
//! 3. keep the active legend category, if one is set
//! 4. color by the hovered axis' value ramp, else by category
//! 5. draw each line left to right, breaking it wherever a value is NaN

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke};
use tracing::debug;

use super::{draw_left_axis, Margin};
use crate::config::ChartSize;
use crate::join::join;
use crate::scale::{extent, LinearScale, OrdinalColor, PointScale, SequentialColor};
use crate::signal::{BrushSignal, BrushSubscription};
use crate::state::{ParallelAction, ParallelState};
use crate::survey::{categories, Dimension, ParallelTuple, RowId};

pub const MARGIN: Margin = Margin::new(50.0, 20.0, 30.0, 20.0);
pub const TICK_COUNT: usize = 5;
const LINE_OPACITY: f32 = 0.4;
const LINE_WIDTH: f32 = 1.5;
const HOVER_WIDTH: f32 = 3.0;
const HOVER_TOLERANCE: f32 = 4.0;

/// Per-axis scales plus the color scales, fixed for a dataset
#[derive(Debug, Clone)]
pub struct ParallelScales {
    y: [LinearScale; 6],
    ramps: [SequentialColor; 6],
    x: PointScale,
    pub color: OrdinalColor,
}

impl ParallelScales {
    pub fn new(data: &[ParallelTuple], inner_width: f64, inner_height: f64) -> Self {
        let domain = |dim: Dimension| extent(data.iter().map(|t| t.value(dim))).unwrap_or((0.0, 1.0));
        let y = Dimension::ALL.map(|dim| LinearScale::new(domain(dim), (inner_height, 0.0)));
        let ramps = Dimension::ALL.map(|dim| SequentialColor::new(domain(dim)));
        let x = PointScale::new(
            Dimension::ALL.iter().map(|d| d.label().to_string()).collect(),
            (0.0, inner_width),
        );
        Self {
            y,
            ramps,
            x,
            color: OrdinalColor::new(categories(data)),
        }
    }

    pub fn y(&self, dim: Dimension) -> &LinearScale {
        &self.y[dim.index()]
    }

    pub fn x(&self, dim: Dimension) -> f64 {
        self.x.position(dim.label()).unwrap_or(0.0)
    }

    pub fn axis_ticks(&self, dim: Dimension) -> Vec<f64> {
        self.y(dim).ticks(TICK_COUNT)
    }

    /// Category color, or the highlighted axis' ramp when one is hovered
    pub fn line_color(&self, tuple: &ParallelTuple, highlight: Option<Dimension>) -> Color32 {
        match highlight {
            Some(dim) => self.ramps[dim.index()].color(tuple.value(dim)),
            None => self.color.color(&tuple.category),
        }
    }

    /// Runs of consecutive defined points; a NaN value splits the line
    pub fn polyline(&self, tuple: &ParallelTuple) -> Vec<Vec<[f64; 2]>> {
        let mut runs = Vec::new();
        let mut run: Vec<[f64; 2]> = Vec::new();
        for dim in Dimension::ALL {
            let value = tuple.value(dim);
            if value.is_nan() {
                if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            } else {
                run.push([self.x(dim), self.y(dim).map(value)]);
            }
        }
        if !run.is_empty() {
            runs.push(run);
        }
        runs
    }
}

/// Tuples surviving the brush selection and then the active category
pub fn visible<'a>(data: &'a [ParallelTuple], state: &ParallelState) -> Vec<&'a ParallelTuple> {
    data.iter()
        .filter(|t| state.selection.contains(t.id))
        .filter(|t| match &state.active_category {
            Some(category) => &t.category == category,
            None => true,
        })
        .collect()
}

fn distance_to_segment(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a[0] + t * dx, a[1] + t * dy);
    ((p[0] - cx).powi(2) + (p[1] - cy).powi(2)).sqrt()
}

/// Id of the line nearest to `pointer`, if any lies within `tolerance`
pub fn hit_test(pointer: [f64; 2], lines: &[(RowId, Vec<Vec<[f64; 2]>>)], tolerance: f64) -> Option<RowId> {
    lines
        .iter()
        .filter_map(|(id, runs)| {
            runs.iter()
                .flat_map(|run| run.windows(2))
                .map(|seg| distance_to_segment(pointer, seg[0], seg[1]))
                .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.min(d))))
                .map(|d| (*id, d))
        })
        .filter(|(_, d)| *d <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

pub struct ParallelPlot {
    size: ChartSize,
    data: Vec<ParallelTuple>,
    scales: ParallelScales,
    state: ParallelState,
    drawn: Vec<RowId>,
    subscription: BrushSubscription,
}

impl ParallelPlot {
    /// Subscribes to the brush signal for as long as the plot lives
    pub fn new(size: ChartSize, signal: &BrushSignal) -> Self {
        let (w, h) = MARGIN.inner(size.width, size.height);
        Self {
            size,
            data: Vec::new(),
            scales: ParallelScales::new(&[], w as f64, h as f64),
            state: ParallelState::default(),
            drawn: Vec::new(),
            subscription: signal.subscribe(),
        }
    }

    pub fn set_data(&mut self, data: Vec<ParallelTuple>) {
        let (w, h) = MARGIN.inner(self.size.width, self.size.height);
        self.scales = ParallelScales::new(&data, w as f64, h as f64);
        debug!(
            "Parallel plot: {} tuples, {} categories",
            data.len(),
            self.scales.color.domain().len()
        );
        self.data = data;
    }

    #[cfg(test)]
    pub fn scales(&self) -> &ParallelScales {
        &self.scales
    }

    #[cfg(test)]
    pub fn state(&self) -> &ParallelState {
        &self.state
    }

    pub fn dispatch(&mut self, action: ParallelAction) {
        self.state = std::mem::take(&mut self.state).reduce(action);
    }

    /// Pull the latest brush selection, if a new one was published
    pub fn sync_signal(&mut self) {
        if let Some(selection) = self.subscription.poll() {
            self.dispatch(ParallelAction::Brushed(selection));
        }
    }

    pub fn visible(&self) -> Vec<&ParallelTuple> {
        visible(&self.data, &self.state)
    }

    /// The hovered line, if it is still among the visible ones
    pub fn hovered_line(&self) -> Option<&ParallelTuple> {
        let id = self.state.hovered_line?;
        visible(&self.data, &self.state).into_iter().find(|t| t.id == id)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        self.sync_signal();
        self.show_controls(ui);

        let (response, painter) = ui.allocate_painter(
            egui::vec2(self.size.width, self.size.height),
            Sense::hover(),
        );
        if self.data.is_empty() {
            return;
        }

        let (inner_w, _) = MARGIN.inner(self.size.width, self.size.height);
        let origin = response.rect.min + egui::vec2(MARGIN.left, MARGIN.top);
        let to_screen = |p: [f64; 2]| origin + egui::vec2(p[0] as f32, p[1] as f32);

        let shown = visible(&self.data, &self.state);
        let ids: Vec<RowId> = shown.iter().map(|t| t.id).collect();
        let diff = join(&self.drawn, &ids, |id| *id);
        if !diff.is_stable() {
            debug!(
                "Parallel lines: {} enter, {} exit, {} kept",
                diff.enter.len(),
                diff.exit.len(),
                diff.update.len()
            );
        }

        let lines: Vec<(RowId, Vec<Vec<[f64; 2]>>)> =
            shown.iter().map(|t| (t.id, self.scales.polyline(t))).collect();

        let hovered = response.hover_pos().and_then(|pos| {
            let local = pos - origin;
            hit_test([local.x as f64, local.y as f64], &lines, HOVER_TOLERANCE as f64)
        });

        if hovered != self.state.hovered_line {
            self.state = std::mem::take(&mut self.state).reduce(ParallelAction::HoverLine(hovered));
        }

        // hovered line goes last so it sits on top
        let hovered_tuple = self.hovered_line();
        for (tuple, (id, runs)) in shown.iter().zip(&lines) {
            if Some(*id) == self.state.hovered_line {
                continue;
            }
            let base = self.scales.line_color(tuple, self.state.highlight);
            let stroke = Stroke::new(LINE_WIDTH, base.gamma_multiply(LINE_OPACITY));
            for run in runs.iter().filter(|r| r.len() > 1) {
                painter.add(egui::Shape::line(run.iter().map(|p| to_screen(*p)).collect(), stroke));
            }
        }
        if let Some(tuple) = hovered_tuple {
            let stroke = Stroke::new(HOVER_WIDTH, self.scales.line_color(tuple, self.state.highlight));
            for run in self.scales.polyline(tuple).iter().filter(|r| r.len() > 1) {
                painter.add(egui::Shape::line(run.iter().map(|p| to_screen(*p)).collect(), stroke));
            }
            draw_tooltip(&painter, response.rect, tuple);
        }

        let mut highlighted = None;
        for dim in Dimension::ALL {
            let x = origin.x + self.scales.x(dim) as f32;
            draw_left_axis(&painter, x, origin.y, self.scales.y(dim), TICK_COUNT);

            let label_rect = painter.text(
                Pos2::new(x, origin.y - 10.0),
                Align2::CENTER_BOTTOM,
                dim.label(),
                FontId::proportional(12.0),
                ui.visuals().text_color(),
            );
            let label = ui.interact(label_rect.expand(2.0), response.id.with(dim), Sense::hover());
            if label.hovered() {
                highlighted = Some(dim);
            }
        }

        painter.text(
            Pos2::new(origin.x + inner_w / 2.0, origin.y - 30.0),
            Align2::CENTER_BOTTOM,
            "Parallel Coordinates Plot of Music & Mental Health Factors",
            FontId::proportional(16.0),
            ui.visuals().text_color(),
        );

        self.drawn = ids;
        if highlighted != self.state.highlight {
            self.state = std::mem::take(&mut self.state).reduce(ParallelAction::Highlight(highlighted));
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let mut picked = None;
        let mut reset = false;
        ui.horizontal_wrapped(|ui| {
            for category in self.scales.color.domain() {
                let color = self.scales.color.color(category);
                let active = self.state.active_category.as_deref() == Some(category.as_str());
                let mut button = egui::Button::new(RichText::new(category).color(Color32::WHITE)).fill(color);
                if active {
                    button = button.stroke(Stroke::new(2.0, ui.visuals().strong_text_color()));
                }
                if ui.add(button).clicked() {
                    picked = Some(category.clone());
                }
            }
            ui.separator();
            if ui.button("Reset").clicked() {
                reset = true;
            }
            ui.label(format!("{} of {} lines", self.visible().len(), self.data.len()));
        });

        if let Some(category) = picked {
            debug!("Legend pick: {}", category);
            self.dispatch(ParallelAction::PickCategory(category));
        }
        if reset {
            debug!("Parallel filters reset");
            self.dispatch(ParallelAction::Reset);
        }
    }
}

/// Field values of the hovered row, pinned to the top-right corner
fn draw_tooltip(painter: &egui::Painter, area: Rect, tuple: &ParallelTuple) {
    let mut text = format!("Streaming Service: {}", tuple.category);
    for dim in Dimension::ALL {
        text.push_str(&format!("\n{}: {}", dim.label(), tuple.value(dim)));
    }

    let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), Color32::BLACK);
    let size = galley.size() + egui::vec2(12.0, 8.0);
    let bg = Rect::from_min_size(Pos2::new(area.right() - 10.0 - size.x, area.top() + 20.0), size);
    painter.rect_filled(bg, 4.0, Color32::WHITE);
    painter.rect_stroke(bg, 4.0, Stroke::new(1.0, Color32::from_gray(204)));
    painter.galley(bg.min + egui::vec2(6.0, 4.0), galley, Color32::BLACK);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::scatter::ScatterPlot;
    use crate::signal::Selection;
    use crate::state::ScatterAction;
    use crate::survey::tests::{full_row, row};
    use crate::survey::{parallel_tuples, scatter_points};

    fn tuples() -> Vec<ParallelTuple> {
        parallel_tuples(&[
            full_row(0, ["18", "2", "3", "1", "0", "0"], "Spotify"),
            full_row(1, ["25", "4", "7", "6", "2", "1"], "Pandora"),
            full_row(2, ["40", "6", "9", "8", "5", "3"], "Spotify"),
            full_row(3, ["60", "1", "1", "2", "9", "10"], "Apple Music"),
        ])
    }

    fn plot(signal: &BrushSignal) -> ParallelPlot {
        let mut plot = ParallelPlot::new(ChartSize::new(1200.0, 600.0), signal);
        plot.set_data(tuples());
        plot
    }

    fn ids(plot: &ParallelPlot) -> Vec<RowId> {
        plot.visible().iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_selection_then_category_intersect() {
        let signal = BrushSignal::new();
        let mut plot = plot(&signal);

        plot.dispatch(ParallelAction::Brushed([0, 1, 3].into_iter().collect()));
        assert_eq!(ids(&plot), vec![0, 1, 3]);

        plot.dispatch(ParallelAction::PickCategory("Spotify".into()));
        assert_eq!(ids(&plot), vec![0]);

        plot.dispatch(ParallelAction::PickCategory("Opera".into()));
        assert!(ids(&plot).is_empty());

        plot.dispatch(ParallelAction::Reset);
        assert_eq!(ids(&plot), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_scales_fixed_under_filtering() {
        let signal = BrushSignal::new();
        let mut plot = plot(&signal);
        let before: Vec<Vec<f64>> = Dimension::ALL.iter().map(|d| plot.scales().axis_ticks(*d)).collect();
        let domain_before = plot.scales().y(Dimension::Age).domain;

        plot.dispatch(ParallelAction::Brushed([2].into_iter().collect()));
        plot.dispatch(ParallelAction::PickCategory("Spotify".into()));
        assert_eq!(ids(&plot), vec![2]);

        let after: Vec<Vec<f64>> = Dimension::ALL.iter().map(|d| plot.scales().axis_ticks(*d)).collect();
        assert_eq!(before, after);
        assert_eq!(plot.scales().y(Dimension::Age).domain, domain_before);
        assert_eq!(domain_before, (18.0, 60.0));
    }

    #[test]
    fn test_nan_breaks_line() {
        let data = parallel_tuples(&[
            full_row(0, ["18", "2", "n/a", "1", "0", "0"], "Spotify"),
            full_row(1, ["30", "5", "4", "2", "3", "6"], "Spotify"),
        ]);
        let scales = ParallelScales::new(&data, 600.0, 300.0);

        let runs = scales.polyline(&data[0]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 3);
        assert!(runs.iter().flatten().all(|p| p[0].is_finite() && p[1].is_finite()));

        assert_eq!(scales.polyline(&data[1]).len(), 1);
    }

    #[test]
    fn test_nan_breaks_line_on_flat_axis() {
        // every defined Anxiety value is 4, so that axis has a zero-width domain
        let data = parallel_tuples(&[
            full_row(0, ["18", "2", "n/a", "1", "0", "0"], "Spotify"),
            full_row(1, ["30", "5", "4", "2", "3", "6"], "Spotify"),
        ]);
        let scales = ParallelScales::new(&data, 600.0, 300.0);
        assert_eq!(scales.y(Dimension::Anxiety).domain, (4.0, 4.0));

        let runs = scales.polyline(&data[0]);
        assert_eq!(runs.len(), 2);
        let anxiety_x = scales.x(Dimension::Anxiety);
        assert!(runs.iter().flatten().all(|p| p[0] != anxiety_x));
    }

    #[test]
    fn test_hovered_line_follows_state_and_filter() {
        let signal = BrushSignal::new();
        let mut plot = plot(&signal);
        assert!(plot.hovered_line().is_none());

        plot.dispatch(ParallelAction::HoverLine(Some(2)));
        assert_eq!(plot.hovered_line().map(|t| t.id), Some(2));

        plot.dispatch(ParallelAction::PickCategory("Pandora".into()));
        assert!(plot.hovered_line().is_none());

        plot.dispatch(ParallelAction::HoverLine(Some(1)));
        assert_eq!(plot.hovered_line().map(|t| t.id), Some(1));
    }

    #[test]
    fn test_highlight_recolors_by_value() {
        let data = tuples();
        let scales = ParallelScales::new(&data, 600.0, 300.0);
        assert_eq!(scales.line_color(&data[0], None), scales.line_color(&data[2], None));
        let low = scales.line_color(&data[0], Some(Dimension::Anxiety));
        let high = scales.line_color(&data[2], Some(Dimension::Anxiety));
        assert_ne!(low, high);
        assert_eq!(high, SequentialColor::new((1.0, 9.0)).color(9.0));
    }

    #[test]
    fn test_hit_test_picks_nearest() {
        let lines = vec![
            (7, vec![vec![[0.0, 0.0], [100.0, 0.0]]]),
            (8, vec![vec![[0.0, 10.0], [100.0, 10.0]]]),
        ];
        assert_eq!(hit_test([50.0, 3.0], &lines, 4.0), Some(7));
        assert_eq!(hit_test([50.0, 8.0], &lines, 4.0), Some(8));
        assert_eq!(hit_test([50.0, 30.0], &lines, 4.0), None);
    }

    #[test]
    fn test_subscription_lives_with_plot() {
        let signal = BrushSignal::new();
        let plot = plot(&signal);
        assert_eq!(signal.subscriber_count(), 1);
        drop(plot);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_brush_on_scatter_filters_lines() {
        let rows = vec![
            full_row(0, ["18", "2", "3", "1", "0", "0"], "Spotify"),
            full_row(1, ["25", "4", "7", "6", "2", "1"], "Pandora"),
            full_row(2, ["40", "6", "9", "8", "5", "3"], "Spotify"),
            row(3, "Pop", "5", "8"),
        ];
        let signal = BrushSignal::new();
        let mut scatter = ScatterPlot::new(ChartSize::new(400.0, 300.0), signal.clone());
        scatter.set_data(scatter_points(&rows));
        let mut parallel = ParallelPlot::new(ChartSize::new(1200.0, 600.0), &signal);
        parallel.set_data(parallel_tuples(&rows));
        parallel.dispatch(ParallelAction::PickCategory("Spotify".into()));

        // hours 3.5..6.5, anxiety 6..10 covers rows 1, 2 and 3
        scatter.dispatch(ScatterAction::DragStart([3.5, 6.0]));
        scatter.dispatch(ScatterAction::DragTo([6.5, 10.0]));
        scatter.dispatch(ScatterAction::DragEnd);
        parallel.sync_signal();
        assert_eq!(parallel.state().selection, Selection::Ids([1, 2, 3].into_iter().collect()));
        assert_eq!(ids(&parallel), vec![2]);

        parallel.dispatch(ParallelAction::Reset);
        assert_eq!(ids(&parallel).len(), 3);

        scatter.dispatch(ScatterAction::Clear);
        parallel.sync_signal();
        assert_eq!(parallel.state().selection, Selection::All);
    }
}
