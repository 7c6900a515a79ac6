//! Diverging colormaps (two-hue progression with center).
//!
//! These colormaps are suitable for data that diverges from a central value.
//! `rdylgn` reversed is the default for trade flows and emission intensities.

use super::colormap::PresetGradient;

/// Names of the diverging presets
pub const NAMES: &[&str] = &["rdylgn", "rdbu", "rdylbu", "spectral", "brbg", "piyg", "puor"];

/// Build a diverging preset by (lowercase) name
pub fn preset(name: &str) -> Option<PresetGradient> {
    let gradient = match name {
        "rdylgn" => colorgrad::rd_yl_gn(),
        "rdbu" => colorgrad::rd_bu(),
        "rdylbu" => colorgrad::rd_yl_bu(),
        "spectral" => colorgrad::spectral(),
        "brbg" => colorgrad::br_bg(),
        "piyg" => colorgrad::pi_yg(),
        "puor" => colorgrad::pu_or(),
        _ => return None,
    };
    Some(PresetGradient::new(name, gradient))
}
