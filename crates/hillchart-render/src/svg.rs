use crate::model::HillChartLayout;
use crate::{Error, Result};
use hillchart_core::curve::smooth_path_data;
use hillchart_core::geom::point;
use std::fmt::Write as _;

const CURVE_STROKE: &str = "#f97316";
const CURVE_STROKE_WIDTH: f64 = 3.0;
const DIVIDER_STROKE: &str = "#4a5568";
const DIVIDER_STROKE_WIDTH: f64 = 1.5;
const DOT_RADIUS: f64 = 13.0;
const DOT_STROKE_WIDTH: f64 = 2.5;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root element id; also prefixes the `<title>` id.
    pub diagram_id: Option<String>,
    /// Extra space around the drawing surface in the viewBox.
    pub viewbox_padding: f64,
    /// Solid fill painted behind the chart. `None` leaves it transparent.
    pub background: Option<String>,
    pub font_family: String,
    pub text_color: String,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            viewbox_padding: 0.0,
            background: None,
            font_family: "Caveat, cursive".to_string(),
            text_color: "#eaeaea".to_string(),
        }
    }
}

pub fn render_svg(layout: &HillChartLayout, options: &SvgRenderOptions) -> Result<String> {
    if !(layout.width.is_finite() && layout.height.is_finite())
        || layout.width <= 0.0
        || layout.height <= 0.0
    {
        return Err(Error::InvalidSurface {
            width: layout.width,
            height: layout.height,
        });
    }

    let diagram_id = escape_attr(options.diagram_id.as_deref().unwrap_or("hillchart"));
    let pad = if options.viewbox_padding.is_finite() {
        options.viewbox_padding.max(0.0)
    } else {
        0.0
    };
    let vb_w = layout.width + 2.0 * pad;
    let vb_h = layout.height + 2.0 * pad;

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{min_x} {min_y} {w} {h}" role="img" aria-labelledby="{id}-title">"#,
        id = diagram_id,
        w = fmt(vb_w),
        h = fmt(vb_h),
        min_x = fmt(-pad),
        min_y = fmt(-pad),
    );
    let _ = write!(
        &mut out,
        r#"<title id="{id}-title">{text}</title>"#,
        id = diagram_id,
        text = escape_xml(&layout.title)
    );
    if let Some(bg) = options.background.as_deref() {
        let _ = write!(
            &mut out,
            r#"<rect class="background" x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"/>"#,
            x = fmt(-pad),
            y = fmt(-pad),
            w = fmt(vb_w),
            h = fmt(vb_h),
            fill = escape_attr(bg)
        );
    }

    let samples: Vec<_> = layout.curve.iter().map(|p| point(p.x, p.y)).collect();
    let _ = write!(
        &mut out,
        r#"<path class="hill-curve" d="{d}" fill="none" stroke="{stroke}" stroke-width="{sw}" stroke-linecap="round" stroke-linejoin="round"/>"#,
        d = smooth_path_data(&samples),
        stroke = CURVE_STROKE,
        sw = fmt(CURVE_STROKE_WIDTH)
    );
    let _ = write!(
        &mut out,
        r#"<line class="hill-divider" x1="{x}" y1="{y1}" x2="{x}" y2="{y2}" stroke="{stroke}" stroke-width="{sw}" stroke-dasharray="5,5"/>"#,
        x = fmt(layout.divider.x),
        y1 = fmt(layout.divider.y1),
        y2 = fmt(layout.divider.y2),
        stroke = DIVIDER_STROKE,
        sw = fmt(DIVIDER_STROKE_WIDTH)
    );

    out.push_str(r#"<g class="scopes">"#);
    for scope in &layout.scopes {
        let _ = write!(
            &mut out,
            r#"<g class="scope-group" data-scope-id="{id}">"#,
            id = escape_attr(&scope.id)
        );
        let _ = write!(
            &mut out,
            r#"<circle class="scope-dot" cx="{cx}" cy="{cy}" r="{r}" fill="{fill}" stroke="white" stroke-width="{sw}"/>"#,
            cx = fmt(scope.x),
            cy = fmt(scope.y),
            r = fmt(DOT_RADIUS),
            fill = escape_attr(&scope.color),
            sw = fmt(DOT_STROKE_WIDTH)
        );
        let _ = write!(
            &mut out,
            r#"<text class="scope-label" x="{x}" y="{y}" text-anchor="middle" font-family="{family}" font-size="{size}" fill="{fill}">{text}</text>"#,
            x = fmt(scope.label.x),
            y = fmt(scope.label.y),
            family = escape_attr(&options.font_family),
            size = fmt(layout.font_size),
            fill = escape_attr(&options.text_color),
            text = escape_xml(&scope.name)
        );
        out.push_str("</g>");
    }
    out.push_str("</g>");
    out.push_str("</svg>");
    Ok(out)
}

fn fmt(v: f64) -> String {
    // Shortest round-trippable form, without `-0` or float noise near integers.
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
