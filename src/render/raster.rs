//! Output encoding: SVG as-is, or rasterized to PNG/JPEG.

use image::{DynamicImage, ImageFormat, RgbaImage};
use once_cell::sync::Lazy;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, TracemapError};
use crate::render::svg::SvgDocument;

/// System fonts, loaded once per process
static FONT_DB: Lazy<Arc<usvg::fontdb::Database>> = Lazy::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "Loaded system fonts");
    Arc::new(db)
});

/// Output file format, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Svg,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("png") => Ok(OutputFormat::Png),
            Some("jpg") | Some("jpeg") => Ok(OutputFormat::Jpeg),
            Some("svg") => Ok(OutputFormat::Svg),
            _ => Err(TracemapError::InvalidParameter {
                param: "output".to_string(),
                message: format!(
                    "Unsupported output format for {} (expected .png, .jpg, .jpeg or .svg)",
                    path.display()
                ),
            }),
        }
    }
}

/// Rasterize an SVG string onto a white canvas of its own size
pub fn rasterize(svg: &str) -> Result<RgbaImage> {
    let mut opt = usvg::Options::default();
    opt.fontdb = FONT_DB.clone();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| TracemapError::ImageGeneration {
        message: format!("Failed to parse SVG: {}", e),
    })?;

    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        TracemapError::ImageGeneration {
            message: format!("Invalid canvas size {}x{}", size.width(), size.height()),
        }
    })?;
    pixmap.fill(resvg::tiny_skia::Color::WHITE);
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // The canvas is opaque, so premultiplied and straight RGBA coincide
    RgbaImage::from_raw(size.width(), size.height(), pixmap.take()).ok_or_else(|| {
        TracemapError::ImageGeneration {
            message: "Pixel buffer does not match the canvas size".to_string(),
        }
    })
}

/// Encode a document in the given format
pub fn encode(doc: &SvgDocument, format: OutputFormat) -> Result<Vec<u8>> {
    let svg = doc.finish();
    if format == OutputFormat::Svg {
        return Ok(svg.into_bytes());
    }

    let img = rasterize(&svg)?;
    let mut buffer = Cursor::new(Vec::new());
    let encoded = match format {
        OutputFormat::Png => img.write_to(&mut buffer, ImageFormat::Png),
        // JPEG has no alpha channel
        _ => DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut buffer, ImageFormat::Jpeg),
    };
    encoded.map_err(|e| TracemapError::ImageGeneration {
        message: format!("Failed to encode {:?}: {}", format, e),
    })?;

    Ok(buffer.into_inner())
}

/// Write a document to `path`, creating missing parent directories
pub fn write_output(doc: &SvgDocument, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    let bytes = encode(doc, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;

    debug!(
        path = %path.display(),
        format = ?format,
        bytes = bytes.len(),
        "Wrote output"
    );
    Ok(())
}
