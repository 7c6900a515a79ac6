//! In-memory data model for map rendering.
//!
//! This module defines the country shapes, centroid locations, flow records and
//! indicator values that the rendering passes consume.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Result, TracemapError};
use crate::geometry::point::{union_rects, BoundingRect, MultiPolygon, Point, Rect};

/// The boundary of one country, possibly made of several polygons
#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
    pub code: String,
    pub geometry: MultiPolygon<f64>,
}

impl CountryShape {
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// The basemap: every country boundary from the boundary dataset
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    pub shapes: Vec<CountryShape>,
}

impl Boundaries {
    pub fn new(shapes: Vec<CountryShape>) -> Self {
        Self { shapes }
    }

    /// Bounding box of all shapes
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.shapes
            .iter()
            .filter_map(CountryShape::bounds)
            .reduce(union_rects)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Representative point of a country
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub code: String,
    pub location: Point,
}

/// Country code to planar coordinate lookup
#[derive(Debug, Clone, Default)]
pub struct CountryLocations {
    locations: HashMap<String, Point>,
}

impl CountryLocations {
    pub fn from_centroids<'a, I: IntoIterator<Item = &'a Centroid>>(centroids: I) -> Self {
        Self {
            locations: centroids
                .into_iter()
                .map(|c| (c.code.clone(), c.location))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<Point> {
        self.locations.get(code).copied()
    }

    /// Look up a code, failing when it is absent from the location table
    pub fn get_checked(&self, code: &str) -> Result<Point> {
        self.get(code).ok_or_else(|| TracemapError::DataNotFound {
            message: format!("Country code not found in location table: {}", code),
        })
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// One directed exchange between two countries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    #[serde(rename = "Export")]
    pub export: String,
    #[serde(rename = "Import")]
    pub import: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

/// Flow records in input order
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    pub records: Vec<FlowRecord>,
}

impl FlowTable {
    pub fn new(records: Vec<FlowRecord>) -> Self {
        Self { records }
    }

    /// Replace non-standard country codes in both code columns
    pub fn remap_ids(&mut self, remap: &BTreeMap<String, String>) {
        for record in &mut self.records {
            if let Some(code) = remap.get(&record.export) {
                record.export = code.clone();
            }
            if let Some(code) = remap.get(&record.import) {
                record.import = code.clone();
            }
        }
    }

    /// Every code appearing as an exporter or an importer
    pub fn codes(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .flat_map(|r| [r.export.as_str(), r.import.as_str()])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Indicator values keyed by country code
#[derive(Debug, Clone, Default)]
pub struct IndicatorTable {
    pub column: String,
    pub values: HashMap<String, f64>,
}

impl IndicatorTable {
    pub fn get(&self, code: &str) -> Option<f64> {
        self.values.get(code).copied()
    }

    /// Left join onto the boundary codes; countries without a value get 0
    pub fn join(&self, boundaries: &Boundaries) -> Vec<(String, f64)> {
        boundaries
            .shapes
            .iter()
            .map(|shape| (shape.code.clone(), self.get(&shape.code).unwrap_or(0.0)))
            .collect()
    }

    /// Rename country codes; fails when a renamed code already has its own value
    pub fn remap_ids(&mut self, remap: &BTreeMap<String, String>) -> Result<()> {
        for (from, to) in remap {
            if from == to || !self.values.contains_key(from) {
                continue;
            }
            if self.values.contains_key(to) {
                return Err(TracemapError::InvalidData {
                    message: format!(
                        "Column '{}' has values for both {} and {}, which are the same country",
                        self.column, from, to
                    ),
                });
            }
            if let Some(value) = self.values.remove(from) {
                self.values.insert(to.clone(), value);
            }
        }
        Ok(())
    }
}

/// Everything the flow map pass needs
#[derive(Debug, Clone)]
pub struct FlowMapData {
    pub boundaries: Boundaries,
    pub centroids: Vec<Centroid>,
    pub flows: FlowTable,
}

impl FlowMapData {
    /// Validate that the datasets can produce a map
    pub fn validate(&self) -> Result<()> {
        if self.flows.is_empty() {
            return Err(TracemapError::InvalidData {
                message: "The flow table contains no records".to_string(),
            });
        }
        if self.boundaries.bounds().is_none() && self.centroids.is_empty() {
            return Err(TracemapError::InvalidData {
                message: "Neither boundaries nor centroids contain any coordinate".to_string(),
            });
        }
        if let Some(record) = self.flows.records.iter().find(|r| !r.value.is_finite()) {
            return Err(TracemapError::InvalidData {
                message: format!(
                    "Flow {} -> {} has a non-finite value",
                    record.export, record.import
                ),
            });
        }
        Ok(())
    }

    /// Centroids that receive a bubble: all of them, or only those involved in a flow
    pub fn bubble_centroids(&self, show_unused: bool) -> Vec<&Centroid> {
        if show_unused {
            return self.centroids.iter().collect();
        }
        let codes = self.flows.codes();
        self.centroids
            .iter()
            .filter(|c| codes.contains(c.code.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{LineString, Polygon};
    use geo::coord;

    fn flow(export: &str, import: &str, value: f64) -> FlowRecord {
        FlowRecord {
            export: export.to_string(),
            import: import.to_string(),
            value,
        }
    }

    fn square(code: &str, x0: f64, y0: f64, size: f64) -> CountryShape {
        let exterior = LineString::from(vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]);
        CountryShape {
            code: code.to_string(),
            geometry: MultiPolygon::new(vec![Polygon::new(exterior, Vec::new())]),
        }
    }

    #[test]
    fn test_remap_and_codes() {
        let mut table = FlowTable::new(vec![flow("GR", "FR", 1.0), flow("DE", "GR", 2.0)]);
        let remap = BTreeMap::from([("GR".to_string(), "EL".to_string())]);
        table.remap_ids(&remap);

        assert_eq!(table.records[0].export, "EL");
        assert_eq!(table.records[1].import, "EL");
        let codes: Vec<&str> = table.codes().into_iter().collect();
        assert_eq!(codes, vec!["DE", "EL", "FR"]);
    }

    #[test]
    fn test_location_lookup() {
        let centroids = vec![Centroid {
            code: "FR".to_string(),
            location: Point::new(1.0, 2.0),
        }];
        let locations = CountryLocations::from_centroids(&centroids);
        assert_eq!(locations.get_checked("FR").unwrap(), Point::new(1.0, 2.0));

        let err = locations.get_checked("XX").unwrap_err();
        assert!(matches!(err, TracemapError::DataNotFound { .. }));
        assert!(err.to_string().contains("XX"));
    }

    #[test]
    fn test_boundaries_bounds() {
        let boundaries = Boundaries::new(vec![square("A", 0.0, 0.0, 2.0), square("B", 5.0, -1.0, 1.0)]);
        let bounds = boundaries.bounds().unwrap();
        assert_eq!(bounds.min(), coord! { x: 0.0, y: -1.0 });
        assert_eq!(bounds.max(), coord! { x: 6.0, y: 2.0 });
        assert!(Boundaries::default().bounds().is_none());
    }

    #[test]
    fn test_indicator_join_fills_missing_with_zero() {
        let boundaries = Boundaries::new(vec![square("FR", 0.0, 0.0, 1.0), square("DE", 1.0, 0.0, 1.0)]);
        let indicators = IndicatorTable {
            column: "intensity".to_string(),
            values: HashMap::from([("FR".to_string(), 0.06)]),
        };
        let joined = indicators.join(&boundaries);
        assert_eq!(
            joined,
            vec![("FR".to_string(), 0.06), ("DE".to_string(), 0.0)]
        );
    }

    #[test]
    fn test_indicator_remap() {
        let mut indicators = IndicatorTable {
            column: "intensity".to_string(),
            values: HashMap::from([("GR".to_string(), 0.5), ("FR".to_string(), 0.06)]),
        };
        let remap = BTreeMap::from([("GR".to_string(), "EL".to_string())]);
        indicators.remap_ids(&remap).unwrap();
        assert_eq!(indicators.get("EL"), Some(0.5));
        assert_eq!(indicators.get("GR"), None);
        assert_eq!(indicators.get("FR"), Some(0.06));
    }

    #[test]
    fn test_indicator_remap_collision_is_rejected() {
        let mut indicators = IndicatorTable {
            column: "intensity".to_string(),
            values: HashMap::from([("GR".to_string(), 0.5), ("EL".to_string(), 0.4)]),
        };
        let remap = BTreeMap::from([("GR".to_string(), "EL".to_string())]);
        let err = indicators.remap_ids(&remap).unwrap_err();
        assert!(matches!(err, TracemapError::InvalidData { .. }));
        assert!(err.to_string().contains("GR"));
        assert!(err.to_string().contains("EL"));
        // Neither value was overwritten
        assert_eq!(indicators.get("EL"), Some(0.4));
    }

    #[test]
    fn test_bubble_selection() {
        let data = FlowMapData {
            boundaries: Boundaries::default(),
            centroids: vec![
                Centroid { code: "FR".to_string(), location: Point::new(0.0, 0.0) },
                Centroid { code: "DE".to_string(), location: Point::new(1.0, 1.0) },
                Centroid { code: "PL".to_string(), location: Point::new(2.0, 1.0) },
            ],
            flows: FlowTable::new(vec![flow("FR", "DE", 3.0)]),
        };
        assert!(data.validate().is_ok());
        assert_eq!(data.bubble_centroids(true).len(), 3);
        let used: Vec<&str> = data.bubble_centroids(false).iter().map(|c| c.code.as_str()).collect();
        assert_eq!(used, vec!["FR", "DE"]);
    }

    #[test]
    fn test_validate_rejects_empty_flows() {
        let data = FlowMapData {
            boundaries: Boundaries::new(vec![square("FR", 0.0, 0.0, 1.0)]),
            centroids: Vec::new(),
            flows: FlowTable::default(),
        };
        assert!(data.validate().is_err());
    }
}
