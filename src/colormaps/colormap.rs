//! Colormap trait and utilities.
//!
//! This module defines the common interface for all colormaps, the matplotlib-style
//! name lookup (with `_r` reversal), resampling into discrete levels and the linear
//! value normalization used by legends.

use crate::error::{Result, TracemapError};

/// Trait for color mapping implementations
pub trait Colormap {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, scale: &ColorScale) -> [u8; 4] {
        self.map_normalized(scale.normalize(value))
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A named `colorgrad` preset
pub struct PresetGradient {
    name: String,
    gradient: colorgrad::Gradient,
}

impl PresetGradient {
    pub fn new(name: &str, gradient: colorgrad::Gradient) -> Self {
        Self {
            name: name.to_string(),
            gradient,
        }
    }
}

impl Colormap for PresetGradient {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        self.gradient.at(value.clamp(0.0, 1.0)).to_rgba8()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A colormap read backwards (matplotlib's `_r` suffix)
pub struct Reversed {
    inner: Box<dyn Colormap>,
    name: String,
}

impl Reversed {
    pub fn new(inner: Box<dyn Colormap>) -> Self {
        let name = format!("{}_r", inner.name());
        Self { inner, name }
    }
}

impl Colormap for Reversed {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        self.inner.map_normalized(1.0 - value.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A colormap resampled into a fixed number of flat color levels
pub struct Discrete {
    inner: Box<dyn Colormap>,
    levels: usize,
}

impl Discrete {
    pub fn new(inner: Box<dyn Colormap>, levels: usize) -> Result<Self> {
        if levels == 0 {
            return Err(TracemapError::InvalidParameter {
                param: "color_levels".to_string(),
                message: "A discrete colormap needs at least one level".to_string(),
            });
        }
        Ok(Self { inner, levels })
    }

    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Index of the level a normalized value falls into
    pub fn level_index(&self, value: f64) -> usize {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        ((value * self.levels as f64) as usize).min(self.levels - 1)
    }

    /// Normalized position at which a level samples the underlying colormap
    pub fn level_position(&self, index: usize) -> f64 {
        if self.levels == 1 {
            0.0
        } else {
            index.min(self.levels - 1) as f64 / (self.levels - 1) as f64
        }
    }
}

impl Colormap for Discrete {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let position = self.level_position(self.level_index(value));
        self.inner.map_normalized(position)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Linear normalization of data values over `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(TracemapError::InvalidData {
                message: format!("Invalid color scale range [{}, {}]", min, max),
            });
        }
        if !(max - min).is_finite() {
            return Err(TracemapError::InvalidData {
                message: format!("Color scale range [{}, {}] is too wide to normalize", min, max),
            });
        }
        Ok(Self { min, max })
    }

    /// Scale spanning the smallest and largest of `values`
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Result<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            if value.is_finite() {
                min = min.min(value);
                max = max.max(value);
            }
        }
        if min > max {
            return Err(TracemapError::InvalidData {
                message: "Cannot build a color scale without any finite value".to_string(),
            });
        }
        Self::new(min, max)
    }

    /// Map a value into [0, 1]; a flat range maps everything to the middle
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

/// Get a colormap by name.
///
/// Names are case-insensitive; a trailing `_r` reverses the colormap.
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    use super::{diverging, sequential};

    let lower = name.trim().to_lowercase();
    if let Some(base) = lower.strip_suffix("_r") {
        return Ok(Box::new(Reversed::new(get_colormap(base)?)));
    }

    let preset = sequential::preset(&lower).or_else(|| diverging::preset(&lower));
    match preset {
        Some(gradient) => Ok(Box::new(gradient)),
        None => Err(TracemapError::InvalidParameter {
            param: "colormap".to_string(),
            message: format!("Unknown colormap: {}", name),
        }),
    }
}

/// Look up a colormap and resample it into `levels` flat colors
pub fn get_discrete_colormap(name: &str, levels: usize) -> Result<Discrete> {
    Discrete::new(get_colormap(name)?, levels)
}

/// Format an RGBA color as an SVG `#rrggbb` string (alpha is dropped)
pub fn to_hex(color: [u8; 4]) -> String {
    format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}
