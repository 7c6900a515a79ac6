//! # tracemap
//!
//! Static maps of trade between countries.
//!
//! This library draws two kinds of figures from country geodata and CSV tables:
//!
//! - **Flow maps**: curved arrows between country centroids, colored by the exchanged
//!   value, over a country-boundary basemap with a discrete colorbar
//! - **Choropleths**: countries filled by an indicator value with a continuous colorbar
//!
//! ## Architecture
//!
//! - **Data Layer**: Loads GeoJSON boundaries/centroids and CSV tables
//! - **Geometry**: Computes the offset, curved arrow for each flow; at most two arrows per
//!   country pair, bent to opposite sides
//! - **Rendering**: Builds an SVG scene and rasterizes it to PNG or JPEG

pub mod colormaps;
pub mod config;
pub mod data_loader;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod registry;
pub mod render;

pub use config::Config;
pub use dataset::{Boundaries, Centroid, FlowMapData, FlowRecord, FlowTable, IndicatorTable};
pub use error::{Result, TracemapError};
pub use geometry::{compute_arrow, ArrowDirection, ArrowGeometry, ArrowParams, Occurrence, Point};
pub use logging::{
    generate_run_id, init_tracing, log_dataset_stats, log_error, log_operation_end,
    log_operation_start, log_timed_operation,
};
pub use registry::DrawnPairs;
