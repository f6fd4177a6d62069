pub type Unit = euclid::UnknownUnit;

/// A point in chart (SVG user-space) coordinates.
pub type Point = euclid::Point2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}
