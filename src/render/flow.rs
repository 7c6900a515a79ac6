//! Flow map rendering pass.
//!
//! Draws the country basemap, one curved arrow per flow record (in input order), the
//! country bubbles with their codes, and a discrete colorbar for the flow values.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::colormaps::{get_discrete_colormap, to_hex, ColorScale, Colormap, Discrete};
use crate::config::{Config, FlowConfig};
use crate::data_loader::load_flow_map_data;
use crate::dataset::{Boundaries, Centroid, CountryLocations, FlowMapData, FlowRecord};
use crate::error::{Result, TracemapError};
use crate::geometry::{
    compute_arrow, points_bounds, union_rects, ArrowGeometry, ArrowParams, Rect as Extent,
};
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::registry::DrawnPairs;
use crate::render::layout::{grid_cells, Rect, SubplotParams, Viewport};
use crate::render::legend::{draw_colorbar, ColorbarStyle};
use crate::render::raster::write_output;
use crate::render::svg::{Anchor, Style, SvgDocument};

/// Relative margin added around the data extent
const MAP_MARGIN: f64 = 0.05;

/// Matplotlib's default tick label size, in points
const TICK_FONT_SIZE: f64 = 10.0;

/// What a flow map pass drew
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlowSummary {
    pub arrows_drawn: usize,
    /// Arrows refused because their pair already carried two
    pub arrows_skipped: usize,
    pub bubbles: usize,
}

/// Draw the country outlines
pub fn draw_basemap(
    doc: &mut SvgDocument,
    viewport: &Viewport,
    boundaries: &Boundaries,
    style: &Style,
) {
    doc.begin_group("basemap");
    for shape in &boundaries.shapes {
        for polygon in &shape.geometry {
            doc.rings(&viewport.project_polygon(polygon), style);
        }
    }
    doc.end_group();
}

/// Pixel sizes of an arrow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStroke {
    pub width: f64,
    pub head_width: f64,
    pub head_length: f64,
}

/// Draw a computed arrow: quadratic arc plus an open head on the destination end
pub fn draw_arrow(
    doc: &mut SvgDocument,
    viewport: &Viewport,
    arrow: &ArrowGeometry,
    color: &str,
    stroke: &ArrowStroke,
) {
    let start = viewport.project_point(arrow.start);
    let end = viewport.project_point(arrow.end);
    let control = viewport.project_point(arrow.control_point());
    let style = Style::stroke(color, stroke.width);
    doc.quadratic(start, control, end, &style);

    let head = viewport.project_point(arrow.head());
    let mut tangent = head - control;
    let mut length = tangent.x().hypot(tangent.y());
    if length < f64::EPSILON {
        tangent = head - viewport.project_point(arrow.tail());
        length = tangent.x().hypot(tangent.y());
    }
    if length < f64::EPSILON {
        return;
    }
    let unit = tangent / length;
    let base = head - unit * stroke.head_length;
    let (px, py) = (-unit.y() * stroke.head_width, unit.x() * stroke.head_width);
    doc.polyline(
        &[
            (base.x() + px, base.y() + py),
            (head.x(), head.y()),
            (base.x() - px, base.y() - py),
        ],
        &style,
    );
}

/// Map and colorbar areas: a 3x2 grid, the map spanning the wide column and the
/// colorbar filling the middle cell of the narrow one
fn figure_areas(width: u32, height: u32) -> Result<(Rect, Rect)> {
    let cells = grid_cells(
        width as f64,
        height as f64,
        &SubplotParams::default(),
        &[1.0, 3.0, 1.0],
        &[75.0, 1.0],
    )?;
    Ok((cells[0][0].union(&cells[2][0]), cells[1][1]))
}

/// Extent of the map: boundaries plus the bubbles drawn on top of them
fn map_bounds(data: &FlowMapData) -> Result<Extent<f64>> {
    let centroid_bounds = points_bounds(data.centroids.iter().map(|c| c.location));
    match (data.boundaries.bounds(), centroid_bounds) {
        (Some(a), Some(b)) => Ok(union_rects(a, b)),
        (Some(a), None) | (None, Some(a)) => Ok(a),
        (None, None) => Err(TracemapError::InvalidData {
            message: "No coordinates to draw".to_string(),
        }),
    }
}

/// Color each flow through the discrete colormap
pub struct FlowColors {
    pub colormap: Discrete,
    pub scale: ColorScale,
}

impl FlowColors {
    pub fn new(config: &FlowConfig, data: &FlowMapData) -> Result<Self> {
        let colormap = get_discrete_colormap(&config.arrows.colormap, config.arrows.color_levels)?;
        let scale = ColorScale::from_values(data.flows.records.iter().map(|r| r.value))?;
        Ok(Self { colormap, scale })
    }

    pub fn level(&self, value: f64) -> usize {
        self.colormap.level_index(self.scale.normalize(value))
    }

    pub fn color(&self, value: f64) -> String {
        to_hex(self.colormap.map(value, &self.scale))
    }
}

/// A flow record with the arrow computed for it
#[derive(Debug, Clone, Copy)]
pub struct PlacedArrow<'a> {
    pub record: &'a FlowRecord,
    pub geometry: ArrowGeometry,
}

/// Arrows of a flow table, in input order
#[derive(Debug, Clone, Default)]
pub struct ArrowLayout<'a> {
    pub arrows: Vec<PlacedArrow<'a>>,
    /// Records refused because their pair already carried two arrows
    pub skipped: usize,
}

/// Compute the arrow of every flow record between the given locations.
///
/// A code missing from `locations` or a pair whose arrow cannot be computed aborts the
/// layout; the error names the flow.
pub fn layout_arrows<'a>(
    records: &'a [FlowRecord],
    locations: &CountryLocations,
    params: &ArrowParams,
) -> Result<ArrowLayout<'a>> {
    let mut layout = ArrowLayout::default();
    let mut drawn = DrawnPairs::new();

    for record in records {
        let origin = locations.get_checked(&record.export)?;
        let destination = locations.get_checked(&record.import)?;

        let Some(occurrence) = drawn.register(&record.export, &record.import) else {
            warn!(
                export = %record.export,
                import = %record.import,
                arrows = drawn.count(&record.export, &record.import),
                "Pair already carries two arrows, skipping flow"
            );
            layout.skipped += 1;
            continue;
        };

        let geometry = compute_arrow(origin, destination, occurrence, params).map_err(|e| match e {
            TracemapError::DegenerateGeometry { message } => TracemapError::DegenerateGeometry {
                message: format!("{} -> {}: {}", record.export, record.import, message),
            },
            other => other,
        })?;
        layout.arrows.push(PlacedArrow { record, geometry });
    }

    Ok(layout)
}

/// Build the flow map scene
pub fn render_flow_map(config: &FlowConfig, data: &FlowMapData) -> Result<(SvgDocument, FlowSummary)> {
    let figure = &config.figure;
    let (width, height) = figure.pixel_size();
    let mut doc = SvgDocument::new(width, height);
    doc.background("white");

    let (map_area, colorbar_area) = figure_areas(width, height)?;
    let viewport = Viewport::fit(map_bounds(data)?, map_area, MAP_MARGIN)?;
    debug!(
        scale = viewport.scale(),
        frame = ?viewport.frame(),
        "Map viewport fitted"
    );

    let basemap_style = Style::fill(&config.basemap.fill).with_stroke(
        &config.basemap.edge_color,
        figure.points_to_pixels(config.basemap.line_width),
    );
    draw_basemap(&mut doc, &viewport, &data.boundaries, &basemap_style);

    let bubbles = data.bubble_centroids(config.bubbles.show_unused);
    let locations = CountryLocations::from_centroids(bubbles.iter().copied());

    let colors = FlowColors::new(config, data)?;
    let layout = layout_arrows(&data.flows.records, &locations, &config.arrow_params())?;
    let stroke = ArrowStroke {
        width: figure.points_to_pixels(config.arrows.width),
        head_width: figure.points_to_pixels(config.arrows.head_width),
        head_length: figure.points_to_pixels(config.arrows.head_length),
    };

    let mut summary = FlowSummary {
        arrows_skipped: layout.skipped,
        ..FlowSummary::default()
    };

    doc.begin_group("arrows");
    for PlacedArrow { record, geometry } in &layout.arrows {
        debug!(
            export = %record.export,
            import = %record.import,
            value = record.value,
            level = colors.level(record.value),
            curvature = geometry.curvature,
            "Drawing arrow"
        );
        draw_arrow(&mut doc, &viewport, geometry, &colors.color(record.value), &stroke);
        summary.arrows_drawn += 1;
    }
    doc.end_group();

    draw_bubbles(&mut doc, &viewport, config, &bubbles);
    summary.bubbles = bubbles.len();

    draw_colorbar(
        &mut doc,
        &colorbar_area,
        &colors.colormap,
        &colors.scale,
        &ColorbarStyle {
            bands: colors.colormap.levels(),
            tick_length: figure.points_to_pixels(3.5),
            tick_font_size: figure.points_to_pixels(TICK_FONT_SIZE),
            label_font_size: figure.points_to_pixels(TICK_FONT_SIZE),
            outline_width: figure.points_to_pixels(0.8),
            max_ticks: 6,
        },
        None,
    );

    Ok((doc, summary))
}

/// Draw a bubble with the country code on top of each location
fn draw_bubbles(doc: &mut SvgDocument, viewport: &Viewport, config: &FlowConfig, bubbles: &[&Centroid]) {
    let figure = &config.figure;
    let radius = figure.points_to_pixels(config.bubbles.size.sqrt() / 2.0);
    let font_size = figure.points_to_pixels(config.bubbles.font_size);
    let fill = Style::fill(&config.bubbles.color);

    doc.begin_group("bubbles");
    for centroid in bubbles {
        doc.circle(viewport.project(centroid.location), radius, &fill);
    }
    for centroid in bubbles {
        doc.text(
            viewport.project(centroid.location),
            &centroid.code,
            font_size,
            &config.bubbles.label_color,
            Anchor::Middle,
        );
    }
    doc.end_group();
}

/// Load the datasets, render the flow map and write it to `output`
pub fn flow_map_to_file(
    config: &Config,
    boundaries: &Path,
    centroids: &Path,
    flows: &Path,
    output: &Path,
) -> Result<FlowSummary> {
    let start = Instant::now();
    log_operation_start("flow_map", Some(&output.display().to_string()));

    let data = load_flow_map_data(boundaries, centroids, flows, &config.data)?;
    let (doc, summary) = log_timed_operation("render_flow_map", || render_flow_map(&config.flow, &data))?;
    write_output(&doc, output)?;

    info!(
        output = %output.display(),
        arrows = summary.arrows_drawn,
        skipped = summary.arrows_skipped,
        bubbles = summary.bubbles,
        "Flow map written"
    );
    log_operation_end("flow_map", start, summary.arrows_skipped == 0);
    Ok(summary)
}
