//! Chart components
//!
//! Each chart splits into a pure layout model (scales, shapes, hit tests)
//! and an egui `show` that paints it and turns input into state actions.

pub mod bar;
pub mod parallel;
pub mod scatter;

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Stroke};

use crate::scale::LinearScale;

/// Space around the plotting area, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margin {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self { top, right, bottom, left }
    }

    pub fn inner(&self, width: f32, height: f32) -> (f32, f32) {
        (
            (width - self.left - self.right).max(0.0),
            (height - self.top - self.bottom).max(0.0),
        )
    }
}

pub(crate) const AXIS_COLOR: Color32 = Color32::from_gray(90);
pub(crate) const TICK_LEN: f32 = 6.0;

/// Tick label text, trimming float noise like 0.30000000000000004
pub(crate) fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Vertical axis at screen x `x`, ticks to the left; `top` is the screen y
/// of range value 0
pub(crate) fn draw_left_axis(painter: &egui::Painter, x: f32, top: f32, scale: &LinearScale, count: usize) {
    let stroke = Stroke::new(1.0, AXIS_COLOR);
    let (r0, r1) = scale.range;
    painter.line_segment(
        [Pos2::new(x, top + r0 as f32), Pos2::new(x, top + r1 as f32)],
        stroke,
    );
    for tick in scale.ticks(count) {
        let y = top + scale.map(tick) as f32;
        painter.line_segment([Pos2::new(x - TICK_LEN, y), Pos2::new(x, y)], stroke);
        painter.text(
            Pos2::new(x - TICK_LEN - 2.0, y),
            Align2::RIGHT_CENTER,
            format_tick(tick),
            FontId::proportional(10.0),
            AXIS_COLOR,
        );
    }
}

/// Text rotated by `angle` radians around its anchor; `end_anchored` puts the
/// end of the text at `pos` instead of the start
pub(crate) fn rotated_text(
    painter: &egui::Painter,
    pos: Pos2,
    text: &str,
    font: FontId,
    color: Color32,
    angle: f32,
    end_anchored: bool,
) {
    let galley = painter.layout_no_wrap(text.to_string(), font, color);
    let size = galley.size();
    let dir = egui::vec2(angle.cos(), angle.sin());
    let normal = egui::vec2(-angle.sin(), angle.cos());
    let mut origin = pos - normal * (size.y / 2.0);
    if end_anchored {
        origin -= dir * size.x;
    }
    painter.add(egui::epaint::TextShape::new(origin, galley, color).with_angle(angle));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_inner_size() {
        let margin = Margin::new(40.0, 20.0, 70.0, 60.0);
        assert_eq!(margin.inner(600.0, 300.0), (520.0, 190.0));
        assert_eq!(margin.inner(50.0, 50.0), (0.0, 0.0));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(4.0), "4");
        assert_eq!(format_tick(0.30000000000000004), "0.3");
        assert_eq!(format_tick(-2.5), "-2.5");
    }
}
