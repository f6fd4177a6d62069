#![forbid(unsafe_code)]

//! `hillchart` bundles the hill chart state model, its URL token codec and (optionally) headless
//! rendering.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`hillchart::render`)
//! - `raster`: enable PNG export via pure-Rust SVG rasterization

pub use hillchart_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use hillchart_render::labels::LabelLayoutOptions;
    pub use hillchart_render::model::{HillChartLayout, ScopeLayout};
    pub use hillchart_render::svg::SvgRenderOptions;
    pub use hillchart_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use hillchart_render::{LayoutOptions, layout_chart};

    use hillchart_core::ChartState;

    #[cfg(feature = "raster")]
    pub mod raster;

    const FALLBACK_FILE_STEM: &str = "hillchart";

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Decode(#[from] hillchart_core::DecodeError),
        #[error(transparent)]
        Render(#[from] hillchart_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    pub fn render_svg_for_state(
        state: &ChartState,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let layout = layout_chart(state, layout_options)?;
        Ok(hillchart_render::render_svg(&layout, svg_options)?)
    }

    /// Decodes `token` (current or legacy format) and renders it.
    ///
    /// Unlike [`hillchart_core::decode_or_default`], an unreadable token is an error here: an
    /// export of the default chart would be silently wrong.
    pub fn render_svg_for_token(
        token: &str,
        layout_options: &LayoutOptions,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        let state = hillchart_core::decode(token)?;
        render_svg_for_state(&state, layout_options, svg_options)
    }

    /// Download file name for an exported chart: `"Q3 Roadmap!"` becomes `q3-roadmap.png`.
    ///
    /// Runs of anything other than `[a-z0-9]` (after lowercasing) collapse into one `-`, leading
    /// and trailing dashes are dropped, and an empty result falls back to `hillchart`.
    pub fn export_file_name(title: &str) -> String {
        let mut stem = String::with_capacity(title.len());
        for ch in title.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                stem.push(ch);
            } else if !stem.is_empty() && !stem.ends_with('-') {
                stem.push('-');
            }
        }
        let stem = stem.trim_end_matches('-');
        let stem = if stem.is_empty() {
            FALLBACK_FILE_STEM
        } else {
            stem
        };
        format!("{stem}.png")
    }

    /// Layout and SVG options bundled for repeated exports.
    #[derive(Debug, Clone, Default)]
    pub struct HeadlessRenderer {
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_width(mut self, width: f64) -> Self {
            self.layout.width = width;
            self
        }

        pub fn with_height(mut self, height: f64) -> Self {
            self.layout.height = height;
            self
        }

        pub fn layout(&self, state: &ChartState) -> Result<HillChartLayout> {
            Ok(layout_chart(state, &self.layout)?)
        }

        pub fn render_svg(&self, state: &ChartState) -> Result<String> {
            render_svg_for_state(state, &self.layout, &self.svg)
        }

        pub fn render_svg_for_token(&self, token: &str) -> Result<String> {
            render_svg_for_token(token, &self.layout, &self.svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png(
            &self,
            state: &ChartState,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::render_png(state, &self.layout, &self.svg, raster)
        }
    }

}
