//! Bar Chart - respondents per favorite genre
//!
//! Sorting animates: each bar slides from its old slot to its new one with a
//! cubic in-out ease.

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense};
use std::collections::HashMap;
use tracing::debug;

use super::{draw_left_axis, rotated_text, Margin, AXIS_COLOR};
use crate::config::ChartSize;
use crate::join::join;
use crate::scale::{BandScale, LinearScale};
use crate::state::{BarAction, BarState, SortMode};
use crate::survey::GenreCount;

pub const MARGIN: Margin = Margin::new(40.0, 20.0, 70.0, 60.0);
const BAND_PADDING: f64 = 0.4;
const BAR_COLOR: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
const LABEL_ANGLE: f32 = -20.0 * std::f32::consts::PI / 180.0;

/// Genres in display order for `mode`
pub fn order_genres(genres: &[GenreCount], mode: SortMode) -> Vec<GenreCount> {
    let mut ordered = genres.to_vec();
    match mode {
        SortMode::Count => ordered.sort_by(|a, b| b.count.cmp(&a.count)),
        SortMode::Alpha => ordered.sort_by(|a, b| a.genre.cmp(&b.genre)),
    }
    ordered
}

/// One bar in plot-area coordinates (origin at the inner top-left)
#[derive(Debug, Clone, PartialEq)]
pub struct BarRect {
    pub genre: String,
    pub count: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct BarLayout {
    pub x: BandScale,
    pub y: LinearScale,
    pub inner_height: f64,
}

impl BarLayout {
    pub fn new(ordered: &[GenreCount], size: ChartSize) -> Self {
        let (w, h) = MARGIN.inner(size.width, size.height);
        let max = ordered.iter().map(|g| g.count).max().unwrap_or(0) as f64;
        Self {
            x: BandScale::new(
                ordered.iter().map(|g| g.genre.clone()).collect(),
                (0.0, w as f64),
                BAND_PADDING,
            ),
            y: LinearScale::new((0.0, max), (h as f64, 0.0)).nice(10),
            inner_height: h as f64,
        }
    }

    pub fn bars(&self, ordered: &[GenreCount]) -> Vec<BarRect> {
        ordered
            .iter()
            .filter_map(|g| {
                let x = self.x.position(&g.genre)?;
                let y = self.y.map(g.count as f64);
                Some(BarRect {
                    genre: g.genre.clone(),
                    count: g.count,
                    x,
                    y,
                    width: self.x.bandwidth(),
                    height: self.inner_height - y,
                })
            })
            .collect()
    }
}

pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Bars sliding from their previous x to the current layout
#[derive(Debug, Clone)]
pub struct SortTransition {
    from: HashMap<String, f64>,
    started: f64,
    duration: f64,
}

impl SortTransition {
    pub fn new(from: HashMap<String, f64>, started: f64, duration: f64) -> Self {
        Self { from, started, duration }
    }

    fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            1.0
        } else {
            ((now - self.started) / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Current x of `genre` heading to `target`
    pub fn x_at(&self, genre: &str, target: f64, now: f64) -> f64 {
        match self.from.get(genre) {
            Some(&from) => from + (target - from) * ease_cubic_in_out(self.progress(now)),
            None => target,
        }
    }

    pub fn is_done(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

pub struct BarChart {
    size: ChartSize,
    duration: f64,
    genres: Vec<GenreCount>,
    state: BarState,
    transition: Option<SortTransition>,
}

impl BarChart {
    pub fn new(size: ChartSize, duration_secs: f32) -> Self {
        Self {
            size,
            duration: duration_secs as f64,
            genres: Vec::new(),
            state: BarState::default(),
            transition: None,
        }
    }

    pub fn set_data(&mut self, genres: Vec<GenreCount>) {
        let diff = join(&self.genres, &genres, |g| g.genre.clone());
        debug!(
            "Bar data: {} enter, {} update, {} exit",
            diff.enter.len(),
            diff.update.len(),
            diff.exit.len()
        );
        self.genres = genres;
        self.transition = None;
    }

    pub fn sort_mode(&self) -> SortMode {
        self.state.sort
    }

    pub fn ordered(&self) -> Vec<GenreCount> {
        order_genres(&self.genres, self.state.sort)
    }

    /// Apply an action at time `now` (seconds)
    pub fn dispatch(&mut self, action: BarAction, now: f64) {
        if action == BarAction::ToggleSort {
            let from = self.current_positions(now);
            self.state = std::mem::take(&mut self.state).reduce(action);
            debug!("Bar sort mode -> {:?}", self.state.sort);
            self.transition = Some(SortTransition::new(from, now, self.duration));
        } else {
            self.state = std::mem::take(&mut self.state).reduce(action);
        }
    }

    /// x of every bar as drawn at `now`, mid-transition included
    fn current_positions(&self, now: f64) -> HashMap<String, f64> {
        let ordered = self.ordered();
        let layout = BarLayout::new(&ordered, self.size);
        layout
            .bars(&ordered)
            .into_iter()
            .map(|bar| {
                let x = match &self.transition {
                    Some(t) => t.x_at(&bar.genre, bar.x, now),
                    None => bar.x,
                };
                (bar.genre, x)
            })
            .collect()
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        let now = ui.input(|i| i.time);

        ui.horizontal(|ui| {
            if ui.button(self.sort_mode().toggle_label()).clicked() {
                self.dispatch(BarAction::ToggleSort, now);
            }
        });

        let (response, painter) = ui.allocate_painter(
            egui::vec2(self.size.width, self.size.height),
            Sense::hover(),
        );
        if self.genres.is_empty() {
            return;
        }

        let ordered = self.ordered();
        let layout = BarLayout::new(&ordered, self.size);
        let (inner_w, inner_h) = MARGIN.inner(self.size.width, self.size.height);
        let origin = response.rect.min + egui::vec2(MARGIN.left, MARGIN.top);

        let mut hovered = None;
        for bar in layout.bars(&ordered) {
            let x = match &self.transition {
                Some(t) => t.x_at(&bar.genre, bar.x, now),
                None => bar.x,
            };
            let rect = Rect::from_min_size(
                origin + egui::vec2(x as f32, bar.y as f32),
                egui::vec2(bar.width as f32, bar.height as f32),
            );
            painter.rect_filled(rect, 0.0, BAR_COLOR);

            let bar_response = ui.interact(rect, response.id.with(&bar.genre), Sense::hover());
            if bar_response.hovered() {
                hovered = Some(bar.genre.clone());
            }
            bar_response.on_hover_ui_at_pointer(|ui| {
                ui.strong(&bar.genre);
                ui.label(format!("Respondents: {}", bar.count));
            });

            // category label under the band, rotated
            let tick = Pos2::new(
                origin.x + (x + bar.width / 2.0) as f32,
                origin.y + inner_h + 10.0,
            );
            rotated_text(
                &painter,
                tick,
                &bar.genre,
                FontId::proportional(10.0),
                AXIS_COLOR,
                LABEL_ANGLE,
                true,
            );
        }
        if hovered != self.state.hovered {
            self.dispatch(BarAction::Hover(hovered), now);
        }

        painter.line_segment(
            [
                Pos2::new(origin.x, origin.y + inner_h),
                Pos2::new(origin.x + inner_w, origin.y + inner_h),
            ],
            egui::Stroke::new(1.0, AXIS_COLOR),
        );
        draw_left_axis(&painter, origin.x, origin.y, &layout.y, 10);

        painter.text(
            Pos2::new(origin.x + inner_w / 2.0, origin.y - 10.0),
            Align2::CENTER_BOTTOM,
            "Favorite Music Genres Distribution",
            FontId::proportional(16.0),
            ui.visuals().text_color(),
        );
        painter.text(
            Pos2::new(origin.x + inner_w / 2.0, origin.y + inner_h + 50.0),
            Align2::CENTER_CENTER,
            "Music Genres",
            FontId::proportional(12.0),
            ui.visuals().text_color(),
        );
        rotated_text(
            &painter,
            Pos2::new(response.rect.min.x + 15.0, origin.y + inner_h / 2.0),
            "Number of Respondents",
            FontId::proportional(12.0),
            ui.visuals().text_color(),
            -std::f32::consts::FRAC_PI_2,
            false,
        );

        if let Some(t) = &self.transition {
            if t.is_done(now) {
                self.transition = None;
            } else {
                ui.ctx().request_repaint();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn genres(pairs: &[(&str, usize)]) -> Vec<GenreCount> {
        pairs
            .iter()
            .map(|(g, c)| GenreCount { genre: g.to_string(), count: *c })
            .collect()
    }

    #[test]
    fn test_order_modes() {
        let data = genres(&[("Rock", 5), ("Jazz", 9), ("Pop", 5)]);
        let by_count: Vec<_> = order_genres(&data, SortMode::Count).into_iter().map(|g| g.genre).collect();
        assert_eq!(by_count, vec!["Jazz", "Rock", "Pop"]);
        let by_name: Vec<_> = order_genres(&data, SortMode::Alpha).into_iter().map(|g| g.genre).collect();
        assert_eq!(by_name, vec!["Jazz", "Pop", "Rock"]);
    }

    #[test]
    fn test_bar_heights_proportional() {
        let data = genres(&[("Rock", 100), ("Pop", 50)]);
        let layout = BarLayout::new(&data, ChartSize::new(600.0, 300.0));
        let bars = layout.bars(&data);
        assert_eq!(layout.y.domain, (0.0, 100.0));
        assert!((bars[0].height - 2.0 * bars[1].height).abs() < 1e-9);
        assert!(bars[0].x < bars[1].x);
    }

    #[test]
    fn test_empty_input_no_bars() {
        let layout = BarLayout::new(&[], ChartSize::new(600.0, 300.0));
        assert!(layout.bars(&[]).is_empty());
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
        assert!(ease_cubic_in_out(0.25) < 0.25);
    }

    #[test]
    fn test_toggle_animates_from_old_slots() {
        let mut chart = BarChart::new(ChartSize::new(600.0, 300.0), 0.75);
        chart.set_data(genres(&[("Rock", 9), ("Jazz", 5)]));

        let before = chart.current_positions(0.0);
        chart.dispatch(BarAction::ToggleSort, 10.0);
        assert_eq!(chart.sort_mode(), SortMode::Alpha);

        let ordered = chart.ordered();
        let layout = BarLayout::new(&ordered, ChartSize::new(600.0, 300.0));
        let target: HashMap<_, _> = layout.bars(&ordered).into_iter().map(|b| (b.genre, b.x)).collect();

        let t = chart.transition.as_ref().unwrap();
        assert_eq!(t.x_at("Rock", target["Rock"], 10.0), before["Rock"]);
        assert!((t.x_at("Rock", target["Rock"], 10.75) - target["Rock"]).abs() < 1e-9);
        assert!(t.is_done(11.0));
    }

    proptest! {
        #[test]
        fn prop_sort_orders_hold(pairs in prop::collection::vec(("[a-e]{1,3}", 1usize..20), 0..12)) {
            let data: Vec<GenreCount> = pairs
                .into_iter()
                .map(|(genre, count)| GenreCount { genre, count })
                .collect();

            let by_count = order_genres(&data, SortMode::Count);
            prop_assert!(by_count.windows(2).all(|w| w[0].count >= w[1].count));

            let by_name = order_genres(&data, SortMode::Alpha);
            prop_assert!(by_name.windows(2).all(|w| w[0].genre <= w[1].genre));
        }
    }
}
