//! Choropleth rendering pass: countries filled by an indicator value.

use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::colormaps::{get_colormap, to_hex, ColorScale, Colormap};
use crate::config::{ChoroplethConfig, Config};
use crate::data_loader::{load_boundaries, load_indicators};
use crate::dataset::{Boundaries, IndicatorTable};
use crate::error::{Result, TracemapError};
use crate::logging::{log_operation_end, log_operation_start, log_timed_operation};
use crate::render::layout::{attach_colorbar, SubplotParams, Viewport};
use crate::render::legend::{draw_colorbar, ColorbarStyle};
use crate::render::raster::write_output;
use crate::render::svg::{Anchor, Style, SvgDocument};

/// Share of the axis width given to the colorbar, and the gap before it
const COLORBAR_FRACTION: f64 = 0.15;
const COLORBAR_PAD: f64 = 0.05;

/// Bands used to approximate the continuous colormap in the legend
const COLORBAR_BANDS: usize = 128;

/// What a choropleth pass drew
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethSummary {
    pub countries: usize,
    /// Countries with no indicator value, drawn as 0
    pub filled_with_zero: usize,
    pub min: f64,
    pub max: f64,
}

/// Build the choropleth scene
pub fn render_choropleth(
    config: &ChoroplethConfig,
    boundaries: &Boundaries,
    indicators: &IndicatorTable,
) -> Result<(SvgDocument, ChoroplethSummary)> {
    let bounds = boundaries.bounds().ok_or_else(|| TracemapError::InvalidData {
        message: "The boundary dataset contains no coordinate".to_string(),
    })?;

    let joined = indicators.join(boundaries);
    let scale = ColorScale::from_values(joined.iter().map(|(_, v)| *v))?;
    let colormap = get_colormap(&config.colormap)?;

    let figure = &config.figure;
    let (width, height) = figure.pixel_size();
    let mut doc = SvgDocument::new(width, height);
    doc.background("white");

    let axis = SubplotParams::default().inner(width as f64, height as f64);
    let (map_area, colorbar_area) =
        attach_colorbar(&axis, COLORBAR_FRACTION, COLORBAR_PAD, config.legend_shrink);
    let viewport = Viewport::fit(bounds, map_area, 0.0)?;

    doc.begin_group("countries");
    for (shape, (_, value)) in boundaries.shapes.iter().zip(&joined) {
        let style = Style::fill(&to_hex(colormap.map(*value, &scale)));
        for polygon in &shape.geometry {
            doc.rings(&viewport.project_polygon(polygon), &style);
        }
    }
    doc.end_group();

    let frame = viewport.frame();
    let title_size = figure.points_to_pixels(config.font_size);
    doc.text(
        (frame.x + frame.width / 2.0, frame.y - title_size),
        &config.title,
        title_size,
        "black",
        Anchor::Middle,
    );

    let tick_size = figure.points_to_pixels(10.0);
    draw_colorbar(
        &mut doc,
        &colorbar_area,
        colormap.as_ref(),
        &scale,
        &ColorbarStyle {
            bands: COLORBAR_BANDS,
            tick_length: figure.points_to_pixels(3.5),
            tick_font_size: tick_size,
            label_font_size: tick_size,
            outline_width: figure.points_to_pixels(0.8),
            max_ticks: 6,
        },
        Some(&config.legend_label),
    );

    let filled_with_zero = boundaries
        .shapes
        .iter()
        .filter(|s| indicators.get(&s.code).is_none())
        .count();
    debug!(
        countries = joined.len(),
        filled_with_zero = filled_with_zero,
        min = scale.min,
        max = scale.max,
        "Choropleth scene built"
    );

    Ok((
        doc,
        ChoroplethSummary {
            countries: joined.len(),
            filled_with_zero,
            min: scale.min,
            max: scale.max,
        },
    ))
}

/// Load the datasets, render the choropleth and write it to `output`
pub fn choropleth_to_file(
    config: &Config,
    boundaries: &Path,
    indicators: &Path,
    output: &Path,
) -> Result<ChoroplethSummary> {
    let start = Instant::now();
    log_operation_start("choropleth", Some(&output.display().to_string()));

    let shapes = load_boundaries(boundaries, &config.data)?;
    let table = load_indicators(indicators, config)?;
    let (doc, summary) = log_timed_operation("render_choropleth", || {
        render_choropleth(&config.choropleth, &shapes, &table)
    })?;
    write_output(&doc, output)?;

    info!(
        output = %output.display(),
        countries = summary.countries,
        filled_with_zero = summary.filled_with_zero,
        "Choropleth written"
    );
    log_operation_end("choropleth", start, true);
    Ok(summary)
}
