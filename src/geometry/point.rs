//! Point and bounding-box helpers on top of the `geo` types.

use geo::{coord, CoordFloat};

pub use geo::{BoundingRect, Coord, LineString, MultiPoint, MultiPolygon, Point, Polygon, Rect};

/// Polar moves and midpoints for points
pub trait PointExt: Sized {
    /// Move this point by `distance` along the direction `(cos(angle), sin(angle))`
    fn offset(self, angle: f64, distance: f64) -> Self;

    fn midpoint(self, other: Self) -> Self;

    fn is_finite(&self) -> bool;
}

impl PointExt for Point<f64> {
    fn offset(self, angle: f64, distance: f64) -> Self {
        self + Point::new(distance * angle.cos(), distance * angle.sin())
    }

    fn midpoint(self, other: Self) -> Self {
        (self + other) / 2.0
    }

    fn is_finite(&self) -> bool {
        self.x().is_finite() && self.y().is_finite()
    }
}

/// Smallest rectangle covering both `a` and `b`
pub fn union_rects<T: CoordFloat>(a: Rect<T>, b: Rect<T>) -> Rect<T> {
    Rect::new(
        coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
        coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
    )
}

/// Bounding box of a set of points, `None` when empty
pub fn points_bounds<I: IntoIterator<Item = Point<f64>>>(points: I) -> Option<Rect<f64>> {
    MultiPoint::from(points.into_iter().collect::<Vec<_>>()).bounding_rect()
}
