//! Colormap implementations for map rendering.
//!
//! This module provides matplotlib-named colormaps backed by `colorgrad` presets.

pub mod colormap;
pub mod diverging;
pub mod sequential;

pub use colormap::{
    get_colormap, get_discrete_colormap, to_hex, ColorScale, Colormap, Discrete, PresetGradient,
    Reversed,
};
