//! Dataset loading functionality.
//!
//! This module reads the GeoJSON boundary and centroid datasets and the CSV tables
//! (flows and indicators), and converts them into the in-memory model of
//! [`crate::dataset`].

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::{Config, DataConfig};
use crate::dataset::{
    Boundaries, Centroid, CountryShape, FlowMapData, FlowRecord, FlowTable, IndicatorTable,
};
use crate::error::{Result, TracemapError};
use crate::geometry::point::{Coord, LineString, MultiPolygon, Point, Polygon};
use crate::logging::log_dataset_stats;

/// GeoJSON feature collection, reduced to what the maps use
#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// GeoJSON feature
#[derive(Debug, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// GeoJSON position; a third ordinate is accepted and ignored
pub type Position = Vec<f64>;

/// GeoJSON geometry
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    /// GeoJSON type name
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::Unsupported => "Unsupported",
        }
    }
}

impl Feature {
    /// Read the country code from the feature properties
    pub fn code(&self, key: &str) -> Option<String> {
        match self.properties.as_ref()?.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Parse a GeoJSON feature collection from a reader
pub fn read_feature_collection<R: Read>(reader: R) -> Result<FeatureCollection> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load a GeoJSON feature collection from a file
pub fn load_feature_collection(path: &Path) -> Result<FeatureCollection> {
    let file = open_file(path)?;
    read_feature_collection(std::io::BufReader::new(file))
}

fn open_file(path: &Path) -> Result<std::fs::File> {
    // Check if the file exists
    if !path.exists() {
        return Err(TracemapError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    Ok(std::fs::File::open(path)?)
}

fn to_coord(position: &[f64]) -> Result<Coord<f64>> {
    match position {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        _ => Err(TracemapError::InvalidData {
            message: format!("Invalid GeoJSON position: {:?}", position),
        }),
    }
}

fn to_point(position: &[f64]) -> Result<Point<f64>> {
    to_coord(position).map(Point::from)
}

fn to_ring(positions: &[Position]) -> Result<LineString<f64>> {
    positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<Result<Vec<_>>>()
        .map(LineString::new)
}

/// The first ring is the exterior; a polygon without rings is empty
fn to_polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|r| to_ring(r));
    let exterior = rings.next().transpose()?.unwrap_or_else(|| LineString::new(Vec::new()));
    Ok(Polygon::new(exterior, rings.collect::<Result<Vec<_>>>()?))
}

/// Convert a feature collection into country boundaries.
///
/// Features without a code, without a geometry or with a non-areal geometry are
/// skipped with a warning.
pub fn boundaries_from_features(collection: &FeatureCollection, key: &str) -> Result<Boundaries> {
    let mut shapes = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let Some(code) = feature.code(key) else {
            warn!(feature = index, key = key, "Skipping boundary feature without a code");
            continue;
        };

        let polygons = match &feature.geometry {
            Some(Geometry::Polygon { coordinates }) => vec![to_polygon(coordinates)?],
            Some(Geometry::MultiPolygon { coordinates }) => coordinates
                .iter()
                .map(|p| to_polygon(p))
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                warn!(code = %code, kind = other.kind(), "Skipping non-areal boundary geometry");
                continue;
            }
            None => {
                warn!(code = %code, "Skipping boundary feature without geometry");
                continue;
            }
        };

        shapes.push(CountryShape {
            code,
            geometry: MultiPolygon::new(polygons),
        });
    }

    Ok(Boundaries::new(shapes))
}

/// Convert a feature collection into country centroids.
///
/// A `MultiPoint` contributes its first position. Anything else is an error: the
/// centroid dataset is expected to hold exactly one point per country.
pub fn centroids_from_features(collection: &FeatureCollection, key: &str) -> Result<Vec<Centroid>> {
    let mut centroids = Vec::with_capacity(collection.features.len());

    for (index, feature) in collection.features.iter().enumerate() {
        let code = feature.code(key).ok_or_else(|| TracemapError::DataNotFound {
            message: format!("Centroid feature {} has no '{}' property", index, key),
        })?;

        let location = match &feature.geometry {
            Some(Geometry::Point { coordinates }) => to_point(coordinates)?,
            Some(Geometry::MultiPoint { coordinates }) => {
                let first = coordinates.first().ok_or_else(|| TracemapError::InvalidData {
                    message: format!("Centroid of {} is an empty MultiPoint", code),
                })?;
                to_point(first)?
            }
            Some(other) => {
                return Err(TracemapError::InvalidData {
                    message: format!(
                        "Centroid of {} must be a Point, found {}",
                        code,
                        other.kind()
                    ),
                });
            }
            None => {
                return Err(TracemapError::InvalidData {
                    message: format!("Centroid of {} has no geometry", code),
                });
            }
        };

        centroids.push(Centroid { code, location });
    }

    Ok(centroids)
}

/// Load the country boundaries from a GeoJSON file
pub fn load_boundaries(path: &Path, data: &DataConfig) -> Result<Boundaries> {
    let collection = load_feature_collection(path)?;
    let boundaries = boundaries_from_features(&collection, &data.country_key)?;
    log_dataset_stats(
        &path.display().to_string(),
        "boundaries",
        boundaries.len(),
        collection.features.len() - boundaries.len(),
    );
    Ok(boundaries)
}

/// Load the country centroids from a GeoJSON file
pub fn load_centroids(path: &Path, data: &DataConfig) -> Result<Vec<Centroid>> {
    let collection = load_feature_collection(path)?;
    let centroids = centroids_from_features(&collection, &data.country_key)?;
    log_dataset_stats(&path.display().to_string(), "centroids", centroids.len(), 0);
    Ok(centroids)
}

/// Read flow records (`Export`, `Import`, `Value`) from CSV data
pub fn read_flows<R: Read>(reader: R, remap: &BTreeMap<String, String>) -> Result<FlowTable> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<FlowRecord>() {
        records.push(row?);
    }

    let mut table = FlowTable::new(records);
    table.remap_ids(remap);
    debug!(records = table.len(), "Parsed flow table");
    Ok(table)
}

/// Load flow records from a CSV file
pub fn load_flows(path: &Path, data: &DataConfig) -> Result<FlowTable> {
    let table = read_flows(open_file(path)?, &data.id_remap)?;
    log_dataset_stats(&path.display().to_string(), "flows", table.len(), 0);
    Ok(table)
}

/// Read an indicator table keyed by `key_column` from CSV data.
///
/// Empty cells are treated as missing values.
pub fn read_indicators<R: Read>(
    reader: R,
    key_column: &str,
    value_column: &str,
    remap: &BTreeMap<String, String>,
) -> Result<IndicatorTable> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TracemapError::DataNotFound {
                message: format!("Column '{}' not found in indicator table", name),
            })
    };
    let key_idx = find(key_column)?;
    let value_idx = find(value_column)?;

    let mut values = HashMap::new();
    for (line, row) in csv_reader.records().enumerate() {
        let row = row?;
        let code = row.get(key_idx).unwrap_or_default();
        let raw = row.get(value_idx).unwrap_or_default();
        if code.is_empty() || raw.is_empty() {
            continue;
        }
        let value = raw.parse::<f64>().map_err(|_| TracemapError::InvalidData {
            message: format!(
                "Row {}: '{}' is not a number in column '{}'",
                line + 1,
                raw,
                value_column
            ),
        })?;
        match values.entry(code.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(_) => {
                return Err(TracemapError::InvalidData {
                    message: format!(
                        "Row {}: {} appears more than once in column '{}'",
                        line + 1,
                        code,
                        key_column
                    ),
                });
            }
        }
    }

    let mut table = IndicatorTable {
        column: value_column.to_string(),
        values,
    };
    table.remap_ids(remap)?;
    Ok(table)
}

/// Load an indicator table from a CSV file
pub fn load_indicators(path: &Path, config: &Config) -> Result<IndicatorTable> {
    let table = read_indicators(
        open_file(path)?,
        &config.data.indicator_key,
        &config.choropleth.column,
        &config.data.id_remap,
    )?;
    log_dataset_stats(&path.display().to_string(), "indicators", table.values.len(), 0);
    Ok(table)
}

/// Load and validate everything the flow map needs
pub fn load_flow_map_data(
    boundaries: &Path,
    centroids: &Path,
    flows: &Path,
    data: &DataConfig,
) -> Result<FlowMapData> {
    let flow_data = FlowMapData {
        boundaries: load_boundaries(boundaries, data)?,
        centroids: load_centroids(centroids, data)?,
        flows: load_flows(flows, data)?,
    };

    flow_data.validate()?;

    info!(
        boundaries = flow_data.boundaries.len(),
        centroids = flow_data.centroids.len(),
        flows = flow_data.flows.len(),
        "Flow map data loaded"
    );

    Ok(flow_data)
}
