//! Scales - map data values to screen positions and colors
//!
//! Linear scales use the familiar 1/2/5 x 10^k tick steps and niceing, so axes
//! read the same as in any web charting library.

use egui::Color32;

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// (first index, last index, increment); a negative increment means 1/|inc|
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = (start * inv).round();
        i2 = (stop * inv).round();
        if i1 / inv < start {
            i1 += 1.0;
        }
        if i2 / inv > stop {
            i2 -= 1.0;
        }
        inc = -inv;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count as f64).2
}

/// Roughly `count` round values spanning [start, stop]
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !start.is_finite() || !stop.is_finite() || count == 0 {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count as f64);
    if !(i2 >= i1) || !inc.is_finite() {
        return Vec::new();
    }

    let n = (i2 - i1 + 1.0) as usize;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();
    if reverse {
        out.reverse();
    }
    out
}

/// Extent of the finite values, NaN ignored
pub fn extent<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Continuous linear mapping from a numeric domain to a range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
        r0 + t * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Extend the domain outward to round tick values
    pub fn nice(mut self, count: usize) -> Self {
        let (mut start, mut stop) = self.domain;
        let reverse = stop < start;
        if reverse {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut prestep = f64::NAN;
        for _ in 0..10 {
            let step = tick_increment(start, stop, count);
            if step == prestep {
                break;
            } else if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            prestep = step;
        }

        self.domain = if reverse { (stop, start) } else { (start, stop) };
        self
    }
}

/// Discrete labels to evenly spaced slots with width
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self::with_padding(domain, range, padding, padding)
    }

    fn with_padding(domain: Vec<String>, range: (f64, f64), inner: f64, outer: f64) -> Self {
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let step = (r1 - r0) / (n - inner + outer * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - inner)) * 0.5;
        Self {
            domain,
            start,
            step,
            bandwidth: step * (1.0 - inner),
        }
    }

    pub fn position(&self, label: &str) -> Option<f64> {
        self.domain
            .iter()
            .position(|d| d == label)
            .map(|i| self.start + self.step * i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }
}

/// Discrete labels to single evenly spaced positions
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale(BandScale);

impl PointScale {
    pub fn new(domain: Vec<String>, range: (f64, f64)) -> Self {
        Self(BandScale::with_padding(domain, range, 1.0, 0.0))
    }

    pub fn position(&self, label: &str) -> Option<f64> {
        self.0.position(label)
    }
}

const CATEGORY10: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// Category value to a palette color, fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub struct OrdinalColor {
    domain: Vec<String>,
}

impl OrdinalColor {
    pub fn new(domain: Vec<String>) -> Self {
        Self { domain }
    }

    pub fn color(&self, category: &str) -> Color32 {
        match self.domain.iter().position(|d| d == category) {
            Some(i) => CATEGORY10[i % CATEGORY10.len()],
            None => Color32::GRAY,
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Light-to-dark blue ramp over a numeric domain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequentialColor {
    scale: LinearScale,
}

const RAMP_LIGHT: [f32; 3] = [247.0, 251.0, 255.0];
const RAMP_DARK: [f32; 3] = [8.0, 48.0, 107.0];

impl SequentialColor {
    pub fn new(domain: (f64, f64)) -> Self {
        Self {
            scale: LinearScale::new(domain, (0.0, 1.0)),
        }
    }

    pub fn color(&self, value: f64) -> Color32 {
        if value.is_nan() {
            return Color32::GRAY;
        }
        let t = self.scale.map(value).clamp(0.0, 1.0) as f32;
        let channel = |i: usize| (RAMP_LIGHT[i] + (RAMP_DARK[i] - RAMP_LIGHT[i]) * t).round() as u8;
        Color32::from_rgb(channel(0), channel(1), channel(2))
    }
}
