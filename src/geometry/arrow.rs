//! Curved arrow geometry between two country bubbles.
//!
//! Given the centroids of an exporting and an importing country, this module computes
//! where a curved arrow should start and end so that it leaves the country bubbles
//! slightly off-axis, and which way it bulges. When two arrows link the same pair of
//! countries (one per direction), the second one is mirrored to the other side of the
//! straight segment so both stay readable.
//!
//! The offset-angle sign table below is a hand-tuned heuristic; keep it exactly as is,
//! the rendered maps depend on it.

use crate::error::{Result, TracemapError};
use crate::geometry::{Point, PointExt};

/// Whether an arrow is the first or the second one drawn for an unordered pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    /// No arrow has been drawn yet between these two countries
    First,
    /// An arrow already links these two countries; bend the other way
    Repeat,
}

impl Occurrence {
    /// +1 for a first arrow, -1 for a repeated one
    pub fn sign(self) -> f64 {
        match self {
            Occurrence::First => 1.0,
            Occurrence::Repeat => -1.0,
        }
    }
}

/// Which end of the computed arc carries the arrowhead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    /// The origin is the left point: head at `end` (`->`)
    LeftToRight,
    /// The origin is the right point: head at `start` (`<-`)
    RightToLeft,
}

/// Tunables for [`compute_arrow`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowParams {
    /// Angle (radians) added to or removed from the segment slope at each end
    pub angle_offset: f64,
    /// Distance in map units between a centroid and the arrow end
    pub radial_offset: f64,
    /// Magnitude of the Arc3 curvature
    pub curvature_radius: f64,
}

/// Output of the arrow geometry calculator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    /// Adjusted left endpoint
    pub start: Point,
    /// Adjusted right endpoint
    pub end: Point,
    /// Signed Arc3 radius; the sign selects the side the curve bulges toward
    pub curvature: f64,
    pub direction: ArrowDirection,
}

impl ArrowGeometry {
    /// The end the arrow leaves from (origin side)
    pub fn tail(&self) -> Point {
        match self.direction {
            ArrowDirection::LeftToRight => self.start,
            ArrowDirection::RightToLeft => self.end,
        }
    }

    /// The end carrying the arrowhead (destination side)
    pub fn head(&self) -> Point {
        match self.direction {
            ArrowDirection::LeftToRight => self.end,
            ArrowDirection::RightToLeft => self.start,
        }
    }

    /// Control point of the quadratic arc from `start` to `end`.
    ///
    /// Same rule as matplotlib's `Arc3` connection style: the midpoint shifted by
    /// `curvature * (dy, -dx)`, evaluated in y-up space.
    pub fn control_point(&self) -> Point {
        let mid = self.start.midpoint(self.end);
        let chord = self.end - self.start;
        mid + Point::new(chord.y(), -chord.x()) * self.curvature
    }
}

/// Compute the curved arrow linking `origin` to `destination`.
///
/// Fails with [`TracemapError::DegenerateGeometry`] when the slope angle is undefined:
/// identical endpoints, endpoints sharing the same x coordinate, or non-finite input.
pub fn compute_arrow(
    origin: Point,
    destination: Point,
    occurrence: Occurrence,
    params: &ArrowParams,
) -> Result<ArrowGeometry> {
    if !origin.is_finite() || !destination.is_finite() {
        return Err(TracemapError::DegenerateGeometry {
            message: format!(
                "Non-finite arrow endpoints: ({}, {}) -> ({}, {})",
                origin.x(), origin.y(), destination.x(), destination.y()
            ),
        });
    }

    if origin == destination {
        return Err(TracemapError::DegenerateGeometry {
            message: format!(
                "Arrow endpoints are identical at ({}, {})",
                origin.x(), origin.y()
            ),
        });
    }

    if origin.x() == destination.x() {
        return Err(TracemapError::DegenerateGeometry {
            message: format!(
                "Arrow endpoints share x = {}; the slope of a vertical segment is undefined",
                origin.x()
            ),
        });
    }

    let (left, right, direction) = if origin.x() < destination.x() {
        (origin, destination, ArrowDirection::LeftToRight)
    } else {
        (destination, origin, ArrowDirection::RightToLeft)
    };

    let left_upper = if left.y() > right.y() { 1.0 } else { -1.0 };

    let alpha = ((left.y() - right.y()) / (left.x() - right.x())).atan();

    let shift = left_upper * params.angle_offset;
    let (beta_left, beta_right) = match occurrence {
        Occurrence::First => (alpha - shift, alpha + shift),
        Occurrence::Repeat => (alpha + shift, alpha - shift),
    };

    let start = left.offset(beta_left, params.radial_offset);
    let end = right.offset(beta_right, -params.radial_offset);

    Ok(ArrowGeometry {
        start,
        end,
        curvature: occurrence.sign() * left_upper * params.curvature_radius,
        direction,
    })
}
