//! Planar geometry used by the map renderers.
//!
//! Coordinates are expressed in the units of the input datasets (usually a projected
//! CRS in meters) with the y axis pointing up. Shapes and points are the `geo` types.

pub mod arrow;
pub mod point;

pub use arrow::{compute_arrow, ArrowDirection, ArrowGeometry, ArrowParams, Occurrence};
pub use point::{points_bounds, union_rects, Point, PointExt, Rect};
