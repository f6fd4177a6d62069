//! The hill shape and the mapping between normalized positions and chart coordinates.
//!
//! Everything here is pure: no state, no I/O, no failure modes. Chart coordinates use SVG
//! conventions (y grows downwards), so the top of the hill has the *smallest* y.

use crate::geom::{Point, point};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const DEFAULT_WIDTH: f64 = 800.0;
pub const DEFAULT_HEIGHT: f64 = 300.0;
pub const DEFAULT_PATH_STEPS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Horizontal inset on both sides of the drawing surface.
    pub padding: f64,
    /// Height of the peak above the baseline.
    pub amplitude: f64,
    /// Y of the curve's feet.
    pub baseline_y: f64,
    /// Width of the bell; smaller values give a steeper hill.
    pub sigma: f64,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            padding: 40.0,
            amplitude: 180.0,
            baseline_y: 250.0,
            sigma: 0.18,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HillCurve {
    pub config: CurveConfig,
}

impl HillCurve {
    const PEAK: f64 = 0.5;

    pub fn new(config: CurveConfig) -> Self {
        Self { config }
    }

    /// Gaussian bell value in `(0, 1]`, equal to 1 at the peak.
    pub fn bell(&self, position: f64) -> f64 {
        let sigma = self.config.sigma;
        let d = position - Self::PEAK;
        (-(d * d) / (2.0 * sigma * sigma)).exp()
    }

    /// Y coordinate of the curve at `position`.
    pub fn height_at(&self, position: f64) -> f64 {
        self.config.baseline_y - self.config.amplitude * self.bell(position)
    }

    pub fn x_at(&self, position: f64, width: f64) -> f64 {
        let (start, end) = self.x_bounds(width);
        start + position * (end - start)
    }

    /// Inverse of [`HillCurve::x_at`].
    ///
    /// The input is clamped to the curve's horizontal extent first, so the result is always in
    /// `[0, 1]`: exactly 0 at or left of the left padding, exactly 1 at or right of the right
    /// padding. A surface too narrow to hold a curve maps everything to 0.
    pub fn normalize(&self, screen_x: f64, width: f64) -> f64 {
        let (start, end) = self.x_bounds(width);
        let span = end - start;
        if span.is_nan() || span <= 0.0 {
            return 0.0;
        }
        let clamped = if screen_x.is_nan() {
            start
        } else {
            screen_x.clamp(start, end)
        };
        (clamped - start) / span
    }

    /// Point on the curve for `position` on a surface of the given width.
    pub fn point_at(&self, position: f64, width: f64) -> Point {
        point(self.x_at(position, width), self.height_at(position))
    }

    /// `steps + 1` evenly spaced samples from the left foot to the right foot.
    pub fn path_samples(&self, width: f64, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point_at(i as f64 / steps as f64, width))
            .collect()
    }

    /// Dashed "figuring out / getting done" separator: `(x, y_top, y_bottom)`.
    pub fn divider(&self, width: f64) -> (f64, f64, f64) {
        let top = self.config.baseline_y - self.config.amplitude - 20.0;
        let bottom = self.config.baseline_y + 15.0;
        (width / 2.0, top, bottom)
    }

    fn x_bounds(&self, width: f64) -> (f64, f64) {
        (self.config.padding, width - self.config.padding)
    }
}

/// SVG path data through `points`, smoothed with quadratic segments between midpoints.
pub fn smooth_path_data(points: &[Point]) -> String {
    let mut out = String::new();
    let Some(first) = points.first() else {
        return out;
    };
    let _ = write!(&mut out, "M {} {}", fmt(first.x), fmt(first.y));
    if points.len() == 1 {
        return out;
    }
    if points.len() == 2 {
        let last = points[1];
        let _ = write!(&mut out, " L {} {}", fmt(last.x), fmt(last.y));
        return out;
    }

    for i in 1..points.len() - 1 {
        let p = points[i];
        let next = points[i + 1];
        let xc = (p.x + next.x) / 2.0;
        let yc = (p.y + next.y) / 2.0;
        let _ = write!(
            &mut out,
            " Q {} {} {} {}",
            fmt(p.x),
            fmt(p.y),
            fmt(xc),
            fmt(yc)
        );
    }

    let last = points[points.len() - 1];
    let second_last = points[points.len() - 2];
    let _ = write!(
        &mut out,
        " Q {} {} {} {}",
        fmt(second_last.x),
        fmt(second_last.y),
        fmt(last.x),
        fmt(last.y)
    );
    out
}

fn fmt(v: f64) -> String {
    // Three fractional digits are plenty for an 800px surface and keep the path short.
    if !v.is_finite() || v.abs() < 0.0005 {
        return "0".to_string();
    }
    let mut s = format!("{:.3}", (v * 1000.0).round() / 1000.0);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}
