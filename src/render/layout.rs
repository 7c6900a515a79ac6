//! Figure layout: grid cells, colorbar placement and map viewports.
//!
//! Fractions follow matplotlib's conventions (figure coordinates with the origin at the
//! bottom-left); the returned rectangles are in pixels with the origin at the top-left.

use crate::error::{Result, TracemapError};
use crate::geometry::point::{Coord, Point, Polygon, Rect as Extent};

/// Pixel rectangle, origin top-left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Figure margins and spacing, as fractions of the figure size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubplotParams {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub wspace: f64,
    pub hspace: f64,
}

impl Default for SubplotParams {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.2,
        }
    }
}

impl SubplotParams {
    /// The area left inside the margins
    pub fn inner(&self, fig_width: f64, fig_height: f64) -> Rect {
        Rect::new(
            self.left * fig_width,
            (1.0 - self.top) * fig_height,
            (self.right - self.left) * fig_width,
            (self.top - self.bottom) * fig_height,
        )
    }
}

/// Split sizes along one axis: `(offset, length)` of each cell, in fractions
fn split(total: f64, space: f64, ratios: &[f64]) -> Vec<(f64, f64)> {
    let n = ratios.len() as f64;
    let cell = total / (n + space * (n - 1.0));
    let sep = space * cell;
    let norm = cell * n / ratios.iter().sum::<f64>();

    let mut offset = 0.0;
    ratios
        .iter()
        .enumerate()
        .map(|(i, ratio)| {
            if i > 0 {
                offset += sep;
            }
            let start = offset;
            offset += ratio * norm;
            (start, ratio * norm)
        })
        .collect()
}

/// Cells of a grid with relative row heights and column widths.
///
/// Returns `cells[row][col]`, rows from the top.
pub fn grid_cells(
    fig_width: f64,
    fig_height: f64,
    params: &SubplotParams,
    height_ratios: &[f64],
    width_ratios: &[f64],
) -> Result<Vec<Vec<Rect>>> {
    if height_ratios.is_empty()
        || width_ratios.is_empty()
        || height_ratios.iter().chain(width_ratios).any(|r| !(r.is_finite() && *r > 0.0))
    {
        return Err(TracemapError::InvalidParameter {
            param: "grid".to_string(),
            message: "Grid ratios must be positive and non-empty".to_string(),
        });
    }

    let inner = params.inner(fig_width, fig_height);
    let rows = split(inner.height, params.hspace, height_ratios);
    let cols = split(inner.width, params.wspace, width_ratios);

    Ok(rows
        .iter()
        .map(|(row_offset, row_height)| {
            cols.iter()
                .map(|(col_offset, col_width)| {
                    Rect::new(
                        inner.x + col_offset,
                        inner.y + row_offset,
                        *col_width,
                        *row_height,
                    )
                })
                .collect()
        })
        .collect())
}

/// Carve a vertical colorbar out of the right side of `parent`.
///
/// Returns the remaining map area and the colorbar rectangle; the colorbar is
/// `shrink` times the parent height, centered vertically, with a 20:1 aspect.
pub fn attach_colorbar(parent: &Rect, fraction: f64, pad: f64, shrink: f64) -> (Rect, Rect) {
    let map = Rect::new(
        parent.x,
        parent.y,
        parent.width * (1.0 - fraction - pad),
        parent.height,
    );
    let height = parent.height * shrink;
    let width = (height / 20.0).min(parent.width * fraction);
    let bar = Rect::new(
        parent.x + parent.width * (1.0 - fraction),
        parent.y + (parent.height - height) / 2.0,
        width,
        height,
    );
    (map, bar)
}

/// Maps dataset coordinates (y up) onto a pixel area (y down) with equal aspect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    bounds: Extent<f64>,
    scale: f64,
    frame: Rect,
}

impl Viewport {
    /// Fit `bounds`, widened by `margin` of its extent on each side, into `area`.
    ///
    /// The result is centered in `area`; degenerate extents are padded by one unit.
    pub fn fit(bounds: Extent<f64>, area: Rect, margin: f64) -> Result<Self> {
        if area.width <= 0.0 || area.height <= 0.0 {
            return Err(TracemapError::ImageGeneration {
                message: format!("Map area is empty: {:?}", area),
            });
        }
        let (min, max) = (bounds.min(), bounds.max());
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return Err(TracemapError::InvalidData {
                message: format!("Non-finite map extent: {:?}", bounds),
            });
        }

        let pad_x = if bounds.width() > 0.0 { bounds.width() * margin } else { 1.0 };
        let pad_y = if bounds.height() > 0.0 { bounds.height() * margin } else { 1.0 };
        let pad = Coord { x: pad_x, y: pad_y };
        let padded = Extent::new(min - pad, max + pad);
        if !(padded.width().is_finite() && padded.height().is_finite()) {
            return Err(TracemapError::InvalidData {
                message: format!("Map extent is too large to project: {:?}", bounds),
            });
        }

        let scale = (area.width / padded.width()).min(area.height / padded.height());
        let width = padded.width() * scale;
        let height = padded.height() * scale;
        let frame = Rect::new(
            area.x + (area.width - width) / 2.0,
            area.y + (area.height - height) / 2.0,
            width,
            height,
        );

        Ok(Self {
            bounds: padded,
            scale,
            frame,
        })
    }

    /// Pixels per map unit
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel rectangle actually covered by the map
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Project a dataset coordinate to pixels
    pub fn project<C: Into<Coord<f64>>>(&self, p: C) -> (f64, f64) {
        let p = p.into();
        (
            self.frame.x + (p.x - self.bounds.min().x) * self.scale,
            self.frame.y + (self.bounds.max().y - p.y) * self.scale,
        )
    }

    pub fn project_point(&self, p: Point<f64>) -> Point<f64> {
        let (x, y) = self.project(p);
        Point::new(x, y)
    }

    /// Pixel rings of a polygon, exterior first
    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Vec<Vec<(f64, f64)>> {
        std::iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .map(|ring| ring.coords().map(|c| self.project(*c)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_flow_grid() {
        let cells = grid_cells(2000.0, 2000.0, &SubplotParams::default(), &[1.0, 3.0, 1.0], &[75.0, 1.0])
            .unwrap();
        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0].len(), 2);

        let map = cells[0][0].union(&cells[2][0]);
        assert!(approx(map.x, 250.0));
        assert!(approx(map.y, 240.0));
        assert!(approx(map.bottom(), 1780.0));

        // The colorbar sits in the middle row of the narrow column
        let bar = cells[1][1];
        assert!(bar.x > map.right());
        assert!(approx(bar.right(), 1800.0));
        assert!(bar.width < map.width / 50.0);
        assert!(bar.height > cells[0][1].height * 2.9);
        assert!(bar.y > cells[0][1].bottom());
    }

    #[test]
    fn test_invalid_ratios() {
        assert!(grid_cells(10.0, 10.0, &SubplotParams::default(), &[], &[1.0]).is_err());
        assert!(grid_cells(10.0, 10.0, &SubplotParams::default(), &[1.0], &[0.0]).is_err());
    }

    #[test]
    fn test_attach_colorbar() {
        let parent = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let (map, bar) = attach_colorbar(&parent, 0.15, 0.05, 0.4);
        assert!(approx(map.width, 800.0));
        assert!(approx(bar.height, 320.0));
        assert!(approx(bar.y, 240.0));
        assert!(approx(bar.x, 850.0));
        assert!(approx(bar.width, 16.0));
    }

    #[test]
    fn test_viewport_projection() {
        let bounds = Extent::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 100.0, y: 50.0 });
        let viewport = Viewport::fit(bounds, Rect::new(0.0, 0.0, 200.0, 200.0), 0.0).unwrap();
        assert!(approx(viewport.scale(), 2.0));

        // Wide extent: centered vertically
        let frame = viewport.frame();
        assert!(approx(frame.y, 50.0));
        assert!(approx(frame.height, 100.0));

        // y axis is flipped
        let (x, y) = viewport.project(Point::new(0.0, 50.0));
        assert!(approx(x, 0.0));
        assert!(approx(y, 50.0));
        let (x, y) = viewport.project(Point::new(100.0, 0.0));
        assert!(approx(x, 200.0));
        assert!(approx(y, 150.0));
    }

    #[test]
    fn test_project_polygon_with_hole() {
        use crate::geometry::point::LineString;

        let bounds = Extent::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        let viewport = Viewport::fit(bounds, Rect::new(0.0, 0.0, 100.0, 100.0), 0.0).unwrap();
        let polygon = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 0.0)]),
            vec![LineString::from(vec![(6.0, 2.0), (8.0, 2.0), (8.0, 4.0), (6.0, 2.0)])],
        );
        let rings = viewport.project_polygon(&polygon);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0].len(), 4);
        assert!(approx(rings[0][1].0, 100.0));
        assert!(approx(rings[0][1].1, 100.0));
        assert!(approx(rings[1][0].0, 60.0));
        assert!(approx(rings[1][0].1, 80.0));
    }

    #[test]
    fn test_viewport_degenerate_extent() {
        let corner = Coord { x: 5.0, y: 5.0 };
        let bounds = Extent::new(corner, corner);
        let viewport = Viewport::fit(bounds, Rect::new(0.0, 0.0, 100.0, 100.0), 0.05).unwrap();
        let (x, y) = viewport.project(Point::new(5.0, 5.0));
        assert!(approx(x, 50.0));
        assert!(approx(y, 50.0));

        assert!(Viewport::fit(bounds, Rect::new(0.0, 0.0, 0.0, 10.0), 0.0).is_err());
    }

    #[test]
    fn test_viewport_rejects_overflowing_extent() {
        let bounds = Extent::new(Coord { x: -1e308, y: 0.0 }, Coord { x: 1e308, y: 1.0 });
        let err = Viewport::fit(bounds, Rect::new(0.0, 0.0, 100.0, 100.0), 0.0).unwrap_err();
        assert!(matches!(err, TracemapError::InvalidData { .. }));
    }
}
