//! Print a summary of a GeoJSON dataset: feature count, country codes, geometry kinds
//! and bounding box. Useful to check a boundary or centroid file before drawing a map.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use tracemap::data_loader::{load_feature_collection, Geometry, Position};
use tracemap::geometry::{points_bounds, Point, PointExt};

/// Summarize a GeoJSON boundary or centroid file
#[derive(Parser, Debug)]
#[command(name = "inspect_geodata")]
#[command(about = "Summarize a GeoJSON boundary or centroid file", long_about = None)]
struct Cli {
    /// GeoJSON file to inspect
    path: PathBuf,

    /// Feature property holding the country code
    #[arg(long, default_value = "CNTR_ID")]
    key: String,
}

fn positions(geometry: &Geometry) -> Vec<&Position> {
    match geometry {
        Geometry::Point { coordinates } => vec![coordinates],
        Geometry::MultiPoint { coordinates } => coordinates.iter().collect(),
        Geometry::Polygon { coordinates } => coordinates.iter().flatten().collect(),
        Geometry::MultiPolygon { coordinates } => coordinates.iter().flatten().flatten().collect(),
        Geometry::Unsupported => Vec::new(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    println!("Inspecting GeoJSON file: {}", cli.path.display());

    let collection = load_feature_collection(&cli.path)
        .with_context(|| format!("Failed to read {}", cli.path.display()))?;

    println!("\n=== FILE INFORMATION ===");
    println!("\nFeatures: {}", collection.features.len());

    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    let mut codes = Vec::new();
    let mut missing_code = 0;
    let mut points = Vec::new();

    for feature in &collection.features {
        match feature.code(&cli.key) {
            Some(code) => codes.push(code),
            None => missing_code += 1,
        }
        let kind = feature.geometry.as_ref().map_or("None", Geometry::kind);
        *kinds.entry(kind).or_default() += 1;

        if let Some(geometry) = &feature.geometry {
            points.extend(
                positions(geometry)
                    .into_iter()
                    .filter_map(|p| match p.as_slice() {
                        [x, y, ..] => Some(Point::new(*x, *y)),
                        _ => None,
                    })
                    .filter(|p| p.is_finite()),
            );
        }
    }

    println!("\nGeometry kinds:");
    for (kind, count) in &kinds {
        println!("  {} = {}", kind, count);
    }

    codes.sort();
    println!("\nCodes ({}): {}", cli.key, codes.len());
    println!("  {}", codes.join(", "));
    if missing_code > 0 {
        println!("  {} features without a '{}' property", missing_code, cli.key);
    }

    println!("\nBounding box:");
    match points_bounds(points) {
        Some(b) => println!(
            "  x: [{}, {}]\n  y: [{}, {}]",
            b.min().x,
            b.max().x,
            b.min().y,
            b.max().y
        ),
        None => println!("  (no coordinates)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_key() {
        let cli = Cli::try_parse_from(["inspect_geodata", "countries.geojson"]).unwrap();
        assert_eq!(cli.path, PathBuf::from("countries.geojson"));
        assert_eq!(cli.key, "CNTR_ID");
    }

    #[test]
    fn test_cli_custom_key_and_missing_path() {
        let cli = Cli::try_parse_from(["inspect_geodata", "c.geojson", "--key", "ISO2"]).unwrap();
        assert_eq!(cli.key, "ISO2");
        assert!(Cli::try_parse_from(["inspect_geodata"]).is_err());
    }
}
