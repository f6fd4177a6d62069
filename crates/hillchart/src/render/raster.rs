use crate::render::{HeadlessError, LayoutOptions, SvgRenderOptions};
use hillchart_core::ChartState;

/// Background painted under exported images.
pub const EXPORT_BACKGROUND: &str = "#1a1a2e";

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("invalid raster scale {0}")]
    InvalidScale(f32),
    #[error("invalid background color {0:?}")]
    InvalidBackground(String),
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Device pixels per chart unit.
    pub scale: f32,
    /// Solid fill behind the chart; `None` keeps transparency.
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Some(EXPORT_BACKGROUND.to_string()),
        }
    }
}

pub fn render_png(
    state: &ChartState,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    let svg = super::render_svg_for_state(state, layout_options, svg_options)?;
    svg_to_png(&svg, raster)
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    let png = pixmap.encode_png().map_err(|_| RasterError::PngEncode)?;
    tracing::debug!(
        width = pixmap.width(),
        height = pixmap.height(),
        bytes = png.len(),
        "rasterized chart"
    );
    Ok(png)
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RasterError::InvalidScale(scale));
    }
    let background = background
        .map(|bg| parse_tiny_skia_color(bg).ok_or_else(|| RasterError::InvalidBackground(bg.to_string())))
        .transpose()?;

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    // Fallback when the handwriting face named by the SVG is not installed.
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    // usvg already maps the root viewBox (negative mins included) onto the canvas.
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;
    if let Some(color) = background {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Parses `transparent`, `white`, `black` and `#rgb` / `#rgba` / `#rrggbb` / `#rrggbbaa`.
pub fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    let [r, g, b, a] = match bytes.len() {
        3 => [hex1(bytes[0])?, hex1(bytes[1])?, hex1(bytes[2])?, 255],
        4 => [hex1(bytes[0])?, hex1(bytes[1])?, hex1(bytes[2])?, hex1(bytes[3])?],
        6 => [
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        ],
        8 => [
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        ],
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn png_size(bytes: &[u8]) -> (u32, u32) {
        // IHDR is always the first chunk: width and height follow the 8-byte signature and the
        // 8-byte chunk header.
        let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        (w, h)
    }

    #[test]
    fn exports_default_chart_at_double_scale() {
        let bytes = render_png(
            &ChartState::default(),
            &LayoutOptions::default(),
            &SvgRenderOptions::default(),
            &RasterOptions::default(),
        )
        .unwrap();
        assert!(bytes.starts_with(PNG_SIGNATURE));
        assert_eq!(png_size(&bytes), (1600, 600));
    }

    #[test]
    fn background_fills_the_first_pixel() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"></svg>"#;
        let pixmap = svg_to_pixmap(svg, 1.0, Some(EXPORT_BACKGROUND)).unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (0x1a, 0x1a, 0x2e, 255));
    }

    #[test]
    fn bad_inputs_are_typed_errors() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"></svg>"#;
        let bad_bg = RasterOptions {
            background: Some("not-a-color".to_string()),
            ..RasterOptions::default()
        };
        assert!(matches!(
            svg_to_png(svg, &bad_bg),
            Err(RasterError::InvalidBackground(_))
        ));
        let bad_scale = RasterOptions {
            scale: 0.0,
            ..RasterOptions::default()
        };
        assert!(matches!(
            svg_to_png(svg, &bad_scale),
            Err(RasterError::InvalidScale(_))
        ));
        assert!(matches!(
            svg_to_png("<not svg", &RasterOptions::default()),
            Err(RasterError::SvgParse)
        ));
    }

    #[test]
    fn parses_short_and_long_hex_colors() {
        let c = parse_tiny_skia_color("#1A1A2E").unwrap().to_color_u8();
        assert_eq!((c.red(), c.green(), c.blue(), c.alpha()), (0x1a, 0x1a, 0x2e, 255));
        let c = parse_tiny_skia_color("#f008").unwrap().to_color_u8();
        assert_eq!((c.red(), c.green(), c.blue(), c.alpha()), (255, 0, 0, 0x88));
        assert!(parse_tiny_skia_color("#12345").is_none());
        assert!(parse_tiny_skia_color("red").is_none());
    }
}
