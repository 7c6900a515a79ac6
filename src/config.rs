//! Configuration management for tracemap.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)
//!
//! The resulting [`Config`] is immutable and handed by reference to the rendering passes.

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::colormaps::get_colormap;
use crate::error::{Result, TracemapError};
use crate::geometry::ArrowParams;

/// Command-line arguments for tracemap
#[derive(Parser, Debug)]
#[command(name = "tracemap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to JSON configuration file
    #[arg(short, long, global = true, env = "TRACEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "TRACEMAP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// What to render
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Draw curved arrows between country centroids, colored by exchange value
    Flow(FlowArgs),
    /// Color countries by an indicator value
    Choropleth(ChoroplethArgs),
}

/// Arguments of the `flow` subcommand
#[derive(ClapArgs, Debug, Clone)]
pub struct FlowArgs {
    /// GeoJSON file with the country boundaries
    #[arg(long)]
    pub boundaries: PathBuf,

    /// GeoJSON file with one point per country
    #[arg(long)]
    pub centroids: PathBuf,

    /// CSV file with Export, Import and Value columns
    #[arg(long)]
    pub flows: PathBuf,

    /// Output image (.png, .jpg or .svg)
    #[arg(short, long, default_value = "output/test.png")]
    pub output: PathBuf,

    /// Output resolution in dots per inch
    #[arg(long)]
    pub dpi: Option<u32>,

    /// Colormap used for the arrows
    #[arg(long)]
    pub colormap: Option<String>,

    /// Also draw bubbles for countries without any flow (`--show-unused false` to disable)
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub show_unused: Option<bool>,
}

/// Arguments of the `choropleth` subcommand
#[derive(ClapArgs, Debug, Clone)]
pub struct ChoroplethArgs {
    /// GeoJSON file with the country boundaries
    #[arg(long)]
    pub boundaries: PathBuf,

    /// CSV file with an ID column and the indicator column
    #[arg(long)]
    pub indicators: PathBuf,

    /// Output image (.png, .jpg or .svg)
    #[arg(short, long, default_value = "output/intensite_co2.png")]
    pub output: PathBuf,

    /// Name of the indicator column
    #[arg(long)]
    pub column: Option<String>,

    /// Map title
    #[arg(long)]
    pub title: Option<String>,

    /// Output resolution in dots per inch
    #[arg(long)]
    pub dpi: Option<u32>,
}

/// Physical size of a rendered figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Width in inches
    pub width_in: f64,
    /// Height in inches
    pub height_in: f64,
    /// Dots per inch
    pub dpi: u32,
}

impl FigureConfig {
    /// Canvas size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Convert typographic points to pixels
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi as f64 / 72.0
    }

    fn validate(&self, section: &str) -> Result<()> {
        if !(self.width_in.is_finite() && self.width_in > 0.0)
            || !(self.height_in.is_finite() && self.height_in > 0.0)
        {
            return Err(TracemapError::Config {
                message: format!("{}: figure size must be positive", section),
            });
        }
        if self.dpi == 0 {
            return Err(TracemapError::Config {
                message: format!("{}: dpi cannot be 0", section),
            });
        }
        Ok(())
    }
}

/// Country-boundary basemap style
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasemapConfig {
    #[serde(default = "default_basemap_fill")]
    pub fill: String,
    #[serde(default = "default_basemap_edge")]
    pub edge_color: String,
    /// Edge width in points
    #[serde(default = "default_basemap_line_width")]
    pub line_width: f64,
}

/// Country bubbles and their labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BubbleConfig {
    /// Marker area in points squared
    #[serde(default = "default_bubble_size")]
    pub size: f64,
    #[serde(default = "default_bubble_color")]
    pub color: String,
    /// Label size in points
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_label_color")]
    pub label_color: String,
    /// Draw bubbles for countries that take part in no flow
    #[serde(default)]
    pub show_unused: bool,
}

/// Arrow shape and coloring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrowConfig {
    /// Line width in points
    #[serde(default = "default_arrow_width")]
    pub width: f64,
    /// Arrowhead width in points
    #[serde(default = "default_head_width")]
    pub head_width: f64,
    /// Arrowhead length in points
    #[serde(default = "default_head_length")]
    pub head_length: f64,
    /// Angular offset in radians applied at each end
    #[serde(default = "default_angle_offset")]
    pub angle_offset: f64,
    /// Radial offset, in map units per unit of bubble size
    #[serde(default = "default_radial_offset_factor")]
    pub radial_offset_factor: f64,
    /// Arc3 curvature magnitude
    #[serde(default = "default_curvature_radius")]
    pub curvature_radius: f64,
    #[serde(default = "default_colormap")]
    pub colormap: String,
    /// Number of flat color levels the colormap is resampled into
    #[serde(default = "default_color_levels")]
    pub color_levels: usize,
}

/// Flow map settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    #[serde(default = "default_flow_figure")]
    pub figure: FigureConfig,
    #[serde(default)]
    pub basemap: BasemapConfig,
    #[serde(default)]
    pub bubbles: BubbleConfig,
    #[serde(default)]
    pub arrows: ArrowConfig,
}

impl FlowConfig {
    /// Geometry parameters for the arrow calculator
    pub fn arrow_params(&self) -> ArrowParams {
        ArrowParams {
            angle_offset: self.arrows.angle_offset,
            radial_offset: self.bubbles.size * self.arrows.radial_offset_factor,
            curvature_radius: self.arrows.curvature_radius,
        }
    }
}

/// Choropleth settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoroplethConfig {
    #[serde(default = "default_choropleth_figure")]
    pub figure: FigureConfig,
    /// Indicator column to color by
    #[serde(default = "default_indicator_column")]
    pub column: String,
    #[serde(default = "default_colormap")]
    pub colormap: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_legend_label")]
    pub legend_label: String,
    /// Colorbar height as a fraction of the map height
    #[serde(default = "default_legend_shrink")]
    pub legend_shrink: f64,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
}

/// Dataset conventions shared by both maps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// GeoJSON property holding the country code
    #[serde(default = "default_country_key")]
    pub country_key: String,
    /// Column of the indicator CSV holding the country code
    #[serde(default = "default_indicator_key")]
    pub indicator_key: String,
    /// Non-standard codes found in the tables, mapped to the codes of the geodata
    #[serde(default = "default_id_remap")]
    pub id_remap: BTreeMap<String, String>,
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub flow: FlowConfig,

    #[serde(default)]
    pub choropleth: ChoroplethConfig,

    #[serde(default)]
    pub data: DataConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<(Self, Command)> {
        Self::from_args(Args::parse())
    }

    /// Build the configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<(Self, Command)> {
        // Start with defaults, or the JSON file (whose missing fields fall back to defaults)
        let mut config = match &args.config {
            Some(config_path) => Self::load_from_file(config_path)?,
            None => Config::default(),
        };

        // Override with command-line arguments
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        match &args.command {
            Command::Flow(flow) => {
                if let Some(dpi) = flow.dpi {
                    config.flow.figure.dpi = dpi;
                }
                if let Some(colormap) = &flow.colormap {
                    config.flow.arrows.colormap = colormap.clone();
                }
                if let Some(show_unused) = flow.show_unused {
                    config.flow.bubbles.show_unused = show_unused;
                }
            }
            Command::Choropleth(choropleth) => {
                if let Some(dpi) = choropleth.dpi {
                    config.choropleth.figure.dpi = dpi;
                }
                if let Some(column) = &choropleth.column {
                    config.choropleth.column = column.clone();
                }
                if let Some(title) = &choropleth.title {
                    config.choropleth.title = title.clone();
                }
            }
        }

        Ok((config, args.command))
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(TracemapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        self.flow.figure.validate("flow")?;
        self.choropleth.figure.validate("choropleth")?;

        let non_negative = [
            ("flow.bubbles.size", self.flow.bubbles.size),
            ("flow.bubbles.font_size", self.flow.bubbles.font_size),
            ("flow.basemap.line_width", self.flow.basemap.line_width),
            ("flow.arrows.width", self.flow.arrows.width),
            ("flow.arrows.head_width", self.flow.arrows.head_width),
            ("flow.arrows.head_length", self.flow.arrows.head_length),
            ("flow.arrows.radial_offset_factor", self.flow.arrows.radial_offset_factor),
            ("flow.arrows.curvature_radius", self.flow.arrows.curvature_radius),
            ("choropleth.font_size", self.choropleth.font_size),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(TracemapError::Config {
                    message: format!("{} must be a finite, non-negative number (got {})", name, value),
                });
            }
        }

        let angle = self.flow.arrows.angle_offset;
        if !(angle > 0.0 && angle < std::f64::consts::FRAC_PI_2) {
            return Err(TracemapError::Config {
                message: format!(
                    "flow.arrows.angle_offset must lie strictly between 0 and pi/2 (got {})",
                    angle
                ),
            });
        }

        if self.flow.arrows.color_levels == 0 {
            return Err(TracemapError::Config {
                message: "flow.arrows.color_levels cannot be 0".to_string(),
            });
        }

        let shrink = self.choropleth.legend_shrink;
        if !(shrink > 0.0 && shrink <= 1.0) {
            return Err(TracemapError::Config {
                message: format!("choropleth.legend_shrink must lie in (0, 1] (got {})", shrink),
            });
        }

        for name in [&self.flow.arrows.colormap, &self.choropleth.colormap] {
            get_colormap(name).map_err(|e| TracemapError::Config {
                message: e.to_string(),
            })?;
        }

        let colors = [
            ("flow.basemap.fill", &self.flow.basemap.fill),
            ("flow.basemap.edge_color", &self.flow.basemap.edge_color),
            ("flow.bubbles.color", &self.flow.bubbles.color),
            ("flow.bubbles.label_color", &self.flow.bubbles.label_color),
        ];
        for (name, color) in colors {
            if color.parse::<colorgrad::Color>().is_err() {
                return Err(TracemapError::Config {
                    message: format!("{}: unparsable color '{}'", name, color),
                });
            }
        }

        if self.data.country_key.is_empty() || self.data.indicator_key.is_empty() {
            return Err(TracemapError::Config {
                message: "Country key columns cannot be empty".to_string(),
            });
        }

        if self.choropleth.column.is_empty() {
            return Err(TracemapError::Config {
                message: "choropleth.column cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flow: FlowConfig::default(),
            choropleth: ChoroplethConfig::default(),
            data: DataConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            figure: default_flow_figure(),
            basemap: BasemapConfig::default(),
            bubbles: BubbleConfig::default(),
            arrows: ArrowConfig::default(),
        }
    }
}

impl Default for BasemapConfig {
    fn default() -> Self {
        Self {
            fill: default_basemap_fill(),
            edge_color: default_basemap_edge(),
            line_width: default_basemap_line_width(),
        }
    }
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            size: default_bubble_size(),
            color: default_bubble_color(),
            font_size: default_font_size(),
            label_color: default_label_color(),
            show_unused: false,
        }
    }
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            width: default_arrow_width(),
            head_width: default_head_width(),
            head_length: default_head_length(),
            angle_offset: default_angle_offset(),
            radial_offset_factor: default_radial_offset_factor(),
            curvature_radius: default_curvature_radius(),
            colormap: default_colormap(),
            color_levels: default_color_levels(),
        }
    }
}

impl Default for ChoroplethConfig {
    fn default() -> Self {
        Self {
            figure: default_choropleth_figure(),
            column: default_indicator_column(),
            colormap: default_colormap(),
            title: default_title(),
            legend_label: default_legend_label(),
            legend_shrink: default_legend_shrink(),
            font_size: default_font_size(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            country_key: default_country_key(),
            indicator_key: default_indicator_key(),
            id_remap: default_id_remap(),
        }
    }
}

// Default value functions for serde
fn default_flow_figure() -> FigureConfig {
    FigureConfig {
        width_in: 10.0,
        height_in: 10.0,
        dpi: 200,
    }
}

fn default_choropleth_figure() -> FigureConfig {
    FigureConfig {
        width_in: 6.4,
        height_in: 4.8,
        dpi: 300,
    }
}

fn default_basemap_fill() -> String {
    "white".to_string()
}

fn default_basemap_edge() -> String {
    "gray".to_string()
}

fn default_basemap_line_width() -> f64 {
    0.5
}

fn default_bubble_size() -> f64 {
    500.0
}

fn default_bubble_color() -> String {
    "#4897CA".to_string()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_label_color() -> String {
    "white".to_string()
}

fn default_arrow_width() -> f64 {
    2.0
}

fn default_head_width() -> f64 {
    2.0
}

fn default_head_length() -> f64 {
    3.0
}

fn default_angle_offset() -> f64 {
    std::f64::consts::PI / 8.0
}

fn default_radial_offset_factor() -> f64 {
    150.0
}

fn default_curvature_radius() -> f64 {
    0.05
}

fn default_colormap() -> String {
    "RdYlGn_r".to_string()
}

fn default_color_levels() -> usize {
    25
}

fn default_indicator_column() -> String {
    "intensity".to_string()
}

fn default_title() -> String {
    "Intensity".to_string()
}

fn default_legend_label() -> String {
    "CO2 intensity (kCO2/MWh)".to_string()
}

fn default_legend_shrink() -> f64 {
    0.4
}

fn default_country_key() -> String {
    "CNTR_ID".to_string()
}

fn default_indicator_key() -> String {
    "ID".to_string()
}

fn default_id_remap() -> BTreeMap<String, String> {
    BTreeMap::from([("GR".to_string(), "EL".to_string())])
}

fn default_log_level() -> String {
    "info".to_string()
}
