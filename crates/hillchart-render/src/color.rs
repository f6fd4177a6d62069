//! Stable per-name marker colors.
//!
//! The hash runs over UTF-16 code units with 32-bit wrapping arithmetic so that a scope keeps
//! the color it had in the browser build of the chart.

pub const PALETTE: [&str; 10] = [
    "#22c55e", // green
    "#3b82f6", // blue
    "#f97316", // orange
    "#ec4899", // pink
    "#8b5cf6", // purple
    "#14b8a6", // teal
    "#f59e0b", // amber
    "#ef4444", // red
    "#06b6d4", // cyan
    "#84cc16", // lime
];

/// `hash = hash * 31 + code_unit`, wrapping at 32 bits.
pub fn name_hash(name: &str) -> i32 {
    name.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

pub fn color_for_name(name: &str) -> &'static str {
    let index = name_hash(name).unsigned_abs() % PALETTE.len() as u32;
    PALETTE[index as usize]
}
