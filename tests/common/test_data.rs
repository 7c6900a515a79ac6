//! Test data generation utilities.
//!
//! This module writes small GeoJSON and CSV datasets with known layouts. Coordinates are
//! in a metric projection, like the real boundary files.

use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Bubble color of the default configuration
pub const BUBBLE_RGB: [u8; 3] = [0x48, 0x97, 0xCA];

/// Country code, lower-left corner and size of each test country
const COUNTRIES: &[(&str, (f64, f64), (f64, f64))] = &[
    ("FR", (0.0, 0.0), (1_000_000.0, 1_000_000.0)),
    ("DE", (1_000_000.0, 500_000.0), (1_000_000.0, 1_000_000.0)),
    ("CH", (1_000_000.0, 0.0), (1_000_000.0, 500_000.0)),
    ("PL", (2_000_000.0, 1_000_000.0), (1_000_000.0, 1_000_000.0)),
    ("EL", (2_000_000.0, -1_000_000.0), (1_000_000.0, 1_000_000.0)),
];

/// Centroids; CH shares its x coordinate with DE
pub const CENTROIDS: &[(&str, f64, f64)] = &[
    ("FR", 500_000.0, 500_000.0),
    ("DE", 1_500_000.0, 1_000_000.0),
    ("CH", 1_500_000.0, 250_000.0),
    ("PL", 2_600_000.0, 1_500_000.0),
    ("EL", 2_500_000.0, -500_000.0),
];

/// Flows using the "GR" alias for Greece; the last FR/DE flow is a third arrow on that pair
pub const FLOWS_CSV: &str = "Export,Import,Value
FR,DE,120.5
DE,FR,80
DE,PL,40
GR,DE,10
FR,DE,5
";

/// Indicator values; PL has none
pub const INDICATORS_CSV: &str = "ID,intensity,year
FR,0.06,2019
DE,0.38,2019
GR,0.45,2019
PL,,2019
";

fn rectangle((x, y): (f64, f64), (w, h): (f64, f64)) -> Value {
    json!([[[x, y], [x + w, y], [x + w, y + h], [x, y + h], [x, y]]])
}

/// Country boundaries as a GeoJSON feature collection; FR is a MultiPolygon
pub fn boundaries_geojson() -> Value {
    let features: Vec<Value> = COUNTRIES
        .iter()
        .map(|(code, origin, size)| {
            let geometry = if *code == "FR" {
                json!({
                    "type": "MultiPolygon",
                    "coordinates": [
                        rectangle(*origin, *size),
                        rectangle((200_000.0, -400_000.0), (200_000.0, 200_000.0)),
                    ],
                })
            } else {
                json!({ "type": "Polygon", "coordinates": rectangle(*origin, *size) })
            };
            json!({
                "type": "Feature",
                "properties": { "CNTR_ID": code, "NAME": format!("Country {}", code) },
                "geometry": geometry,
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Country centroids as a GeoJSON feature collection of points
pub fn centroids_geojson() -> Value {
    let features: Vec<Value> = CENTROIDS
        .iter()
        .map(|(code, x, y)| {
            json!({
                "type": "Feature",
                "properties": { "CNTR_ID": code },
                "geometry": { "type": "Point", "coordinates": [x, y] },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Paths of a full set of input files
pub struct Fixture {
    pub boundaries: PathBuf,
    pub centroids: PathBuf,
    pub flows: PathBuf,
    pub indicators: PathBuf,
}

/// Write all datasets into `dir`
pub fn write_fixture(dir: &Path) -> std::io::Result<Fixture> {
    let fixture = Fixture {
        boundaries: dir.join("countries.geojson"),
        centroids: dir.join("centroids.geojson"),
        flows: dir.join("flows.csv"),
        indicators: dir.join("intensity.csv"),
    };

    fs::write(&fixture.boundaries, boundaries_geojson().to_string())?;
    fs::write(&fixture.centroids, centroids_geojson().to_string())?;
    fs::write(&fixture.flows, FLOWS_CSV)?;
    fs::write(&fixture.indicators, INDICATORS_CSV)?;

    Ok(fixture)
}

/// Replace the flow table of a fixture
pub fn write_flows(fixture: &Fixture, csv: &str) -> std::io::Result<()> {
    fs::write(&fixture.flows, csv)
}
