//! Rendering of flow maps and choropleths.
//!
//! Scenes are assembled as SVG documents and then written as SVG or rasterized.

pub mod choropleth;
pub mod flow;
pub mod layout;
pub mod legend;
pub mod raster;
pub mod svg;

pub use choropleth::{choropleth_to_file, render_choropleth, ChoroplethSummary};
pub use flow::{flow_map_to_file, layout_arrows, render_flow_map, ArrowLayout, FlowSummary, PlacedArrow};
pub use raster::{write_output, OutputFormat};
pub use svg::SvgDocument;
