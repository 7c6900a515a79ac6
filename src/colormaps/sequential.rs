//! Sequential colormaps (single-hue or perceptually uniform progression).
//!
//! These colormaps are suitable for data that progresses from low to high.

use super::colormap::PresetGradient;

/// Names of the sequential presets
pub const NAMES: &[&str] = &[
    "viridis", "plasma", "inferno", "magma", "cividis", "turbo", "greens", "reds", "blues",
    "greys",
];

/// Build a sequential preset by (lowercase) name
pub fn preset(name: &str) -> Option<PresetGradient> {
    let gradient = match name {
        "viridis" => colorgrad::viridis(),
        "plasma" => colorgrad::plasma(),
        "inferno" => colorgrad::inferno(),
        "magma" => colorgrad::magma(),
        "cividis" => colorgrad::cividis(),
        "turbo" => colorgrad::turbo(),
        "greens" => colorgrad::greens(),
        "reds" => colorgrad::reds(),
        "blues" => colorgrad::blues(),
        "greys" => colorgrad::greys(),
        _ => return None,
    };
    Some(PresetGradient::new(name, gradient))
}
