//! Vertical stacking of marker labels that would otherwise overlap.
//!
//! Markers are grouped by horizontal proximity: after sorting by x, a new group starts wherever
//! the gap to the previous marker is at least [`LabelLayoutOptions::proximity`]. Grouping is
//! transitive, so a chain of close markers forms one group even if its ends are far apart.
//! Within a group of two or more, labels climb one `spacing` step per marker in ascending x
//! order. Singletons keep the base offset.

use hillchart_core::{HillCurve, Scope};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelLayoutOptions {
    /// Offset from the marker center to the label baseline. Negative is upwards.
    pub base_offset: f64,
    /// Extra lift per stacked label.
    pub spacing: f64,
    /// Most-upward offset a label may get, however large its group.
    pub min_offset: f64,
    /// Markers closer than this (in chart units) share a group.
    pub proximity: f64,
    /// Gap kept between a label and the left/right edge of the surface.
    pub label_padding: f64,
}

impl Default for LabelLayoutOptions {
    fn default() -> Self {
        Self {
            base_offset: -24.0,
            spacing: 28.0,
            min_offset: -250.0,
            proximity: 80.0,
            label_padding: 6.0,
        }
    }
}

/// Label offsets for `(id, x)` markers, keyed by id in input order.
pub fn stack_offsets(markers: &[(&str, f64)], options: &LabelLayoutOptions) -> IndexMap<String, f64> {
    let mut offsets: IndexMap<String, f64> = markers
        .iter()
        .map(|(id, _)| ((*id).to_string(), options.base_offset))
        .collect();
    if markers.len() < 2 {
        return offsets;
    }

    // Stable sort: markers at the same x stack in input order.
    let mut order: Vec<usize> = (0..markers.len()).collect();
    order.sort_by(|&a, &b| markers[a].1.total_cmp(&markers[b].1));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current = vec![order[0]];
    for pair in order.windows(2) {
        let gap = markers[pair[1]].1 - markers[pair[0]].1;
        if gap < options.proximity {
            current.push(pair[1]);
        } else {
            groups.push(std::mem::replace(&mut current, vec![pair[1]]));
        }
    }
    groups.push(current);

    for group in groups.iter().filter(|g| g.len() > 1) {
        for (level, &idx) in group.iter().enumerate() {
            let offset = (options.base_offset - level as f64 * options.spacing).max(options.min_offset);
            if let Some(slot) = offsets.get_mut(markers[idx].0) {
                *slot = offset;
            }
        }
    }
    offsets
}

/// [`stack_offsets`] for scopes placed on `curve` over a surface of `width`.
pub fn label_offsets(
    scopes: &[Scope],
    curve: &HillCurve,
    width: f64,
    options: &LabelLayoutOptions,
) -> IndexMap<String, f64> {
    let markers: Vec<(&str, f64)> = scopes
        .iter()
        .map(|s| (s.id.as_str(), curve.x_at(s.position, width)))
        .collect();
    stack_offsets(&markers, options)
}

/// Horizontal label center that keeps a `label_width` wide label (plus `padding`) on the surface.
///
/// A label wider than the usable span is centered on the surface instead.
pub fn clamp_label_center(x: f64, label_width: f64, surface_width: f64, padding: f64) -> f64 {
    let half = label_width / 2.0;
    let min_x = half + padding;
    let max_x = surface_width - half - padding;
    if min_x > max_x {
        return surface_width / 2.0;
    }
    x.clamp(min_x, max_x)
}
