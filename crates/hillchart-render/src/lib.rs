#![forbid(unsafe_code)]

//! Headless layout and SVG output for hill charts.
//!
//! [`layout_chart`] turns a [`ChartState`] into a [`HillChartLayout`] (curve samples, divider,
//! marker and label positions, colors); [`svg::render_svg`] writes that layout as SVG.

pub mod color;
pub mod labels;
pub mod model;
pub mod svg;
pub mod text;

use crate::labels::{LabelLayoutOptions, clamp_label_center, label_offsets};
use crate::model::{HillChartLayout, LayoutDivider, LayoutLabel, LayoutPoint, ScopeLayout};
use crate::text::{DeterministicTextMeasurer, TextMeasurer, TextStyle};
use hillchart_core::curve::{DEFAULT_HEIGHT, DEFAULT_PATH_STEPS, DEFAULT_WIDTH};
use hillchart_core::{ChartState, CurveConfig, HillCurve};
use std::sync::Arc;

pub use svg::{SvgRenderOptions, render_svg};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid drawing surface {width}x{height}")]
    InvalidSurface { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub font_family: Option<String>,
    pub path_steps: usize,
    pub curve: CurveConfig,
    pub labels: LabelLayoutOptions,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            font_size: 16.0,
            font_family: None,
            path_steps: DEFAULT_PATH_STEPS,
            curve: CurveConfig::default(),
            labels: LabelLayoutOptions::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

impl std::fmt::Debug for LayoutOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutOptions")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("font_size", &self.font_size)
            .field("font_family", &self.font_family)
            .field("path_steps", &self.path_steps)
            .field("curve", &self.curve)
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

pub fn layout_chart(state: &ChartState, options: &LayoutOptions) -> Result<HillChartLayout> {
    let (width, height) = (options.width, options.height);
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(Error::InvalidSurface { width, height });
    }

    let curve = HillCurve::new(options.curve);
    let samples = curve
        .path_samples(width, options.path_steps)
        .into_iter()
        .map(|p| LayoutPoint { x: p.x, y: p.y })
        .collect();
    let (divider_x, divider_top, divider_bottom) = curve.divider(width);

    let offsets = label_offsets(&state.scopes, &curve, width, &options.labels);
    let style = TextStyle {
        font_family: options.font_family.clone(),
        font_size: options.font_size,
    };

    let scopes = state
        .scopes
        .iter()
        .map(|scope| {
            let at = curve.point_at(scope.position, width);
            let offset = offsets
                .get(&scope.id)
                .copied()
                .unwrap_or(options.labels.base_offset);
            let metrics = options.text_measurer.measure(&scope.name, &style);
            ScopeLayout {
                id: scope.id.clone(),
                name: scope.name.clone(),
                position: scope.position,
                x: at.x,
                y: at.y,
                color: color::color_for_name(&scope.name).to_string(),
                label: LayoutLabel {
                    x: clamp_label_center(at.x, metrics.width, width, options.labels.label_padding),
                    y: at.y + offset,
                    offset,
                    width: metrics.width,
                    height: metrics.height,
                },
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(scopes = scopes.len(), width, height, "laid out hill chart");

    Ok(HillChartLayout {
        title: state.title.clone(),
        width,
        height,
        font_size: options.font_size,
        curve: samples,
        divider: LayoutDivider {
            x: divider_x,
            y1: divider_top,
            y2: divider_bottom,
        },
        scopes,
    })
}
