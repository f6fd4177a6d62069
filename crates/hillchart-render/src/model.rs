use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutDivider {
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutLabel {
    /// Horizontal center, already clamped onto the surface.
    pub x: f64,
    /// Baseline y (`marker y + offset`).
    pub y: f64,
    pub offset: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeLayout {
    pub id: String,
    pub name: String,
    pub position: f64,
    /// Marker center.
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub label: LayoutLabel,
}

/// Everything needed to draw one chart, in chart units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HillChartLayout {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    /// Curve samples from the left foot to the right foot.
    pub curve: Vec<LayoutPoint>,
    pub divider: LayoutDivider,
    /// One entry per scope, in state order (which is also paint order).
    pub scopes: Vec<ScopeLayout>,
}

impl HillChartLayout {
    pub fn scope(&self, id: &str) -> Option<&ScopeLayout> {
        self.scopes.iter().find(|s| s.id == id)
    }
}
