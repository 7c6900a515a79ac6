//! Minimal SVG scene builder.
//!
//! Shapes are appended in draw order, so later calls paint over earlier ones. All
//! coordinates are pixels with the origin at the top-left corner.

use std::fmt::Write;

use crate::geometry::Point;
use crate::render::layout::Rect;

/// Fill and stroke of a shape
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
}

impl Style {
    pub fn fill(color: &str) -> Self {
        Self {
            fill: Some(color.to_string()),
            stroke: None,
            stroke_width: 0.0,
        }
    }

    pub fn stroke(color: &str, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color.to_string()),
            stroke_width: width,
        }
    }

    pub fn with_stroke(mut self, color: &str, width: f64) -> Self {
        self.stroke = Some(color.to_string());
        self.stroke_width = width;
        self
    }

    fn attributes(&self) -> String {
        let mut attrs = format!(
            "fill=\"{}\"",
            escape_xml(self.fill.as_deref().unwrap_or("none"))
        );
        if let Some(stroke) = &self.stroke {
            let _ = write!(
                attrs,
                " stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linejoin=\"round\"",
                escape_xml(stroke),
                self.stroke_width
            );
        }
        attrs
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// An SVG document under construction
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    body: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paint the whole canvas
    pub fn background(&mut self, color: &str) {
        let full = Rect::new(0.0, 0.0, self.width as f64, self.height as f64);
        self.rect(&full, &Style::fill(color));
    }

    pub fn begin_group(&mut self, id: &str) {
        let _ = writeln!(self.body, "<g id=\"{}\">", escape_xml(id));
    }

    pub fn end_group(&mut self) {
        self.body.push_str("</g>\n");
    }

    pub fn rect(&mut self, rect: &Rect, style: &Style) {
        let _ = writeln!(
            self.body,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" {}/>",
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            style.attributes()
        );
    }

    pub fn circle(&mut self, center: (f64, f64), radius: f64, style: &Style) {
        let _ = writeln!(
            self.body,
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" {}/>",
            center.0,
            center.1,
            radius,
            style.attributes()
        );
    }

    /// Filled rings; holes are cut with the even-odd rule
    pub fn rings(&mut self, rings: &[Vec<(f64, f64)>], style: &Style) {
        let mut d = String::new();
        for ring in rings {
            let mut points = ring.iter();
            let Some(first) = points.next() else { continue };
            let _ = write!(d, "M{:.2} {:.2}", first.0, first.1);
            for p in points {
                let _ = write!(d, "L{:.2} {:.2}", p.0, p.1);
            }
            d.push('Z');
        }
        if d.is_empty() {
            return;
        }
        let _ = writeln!(
            self.body,
            "<path d=\"{}\" fill-rule=\"evenodd\" {}/>",
            d,
            style.attributes()
        );
    }

    /// Open polyline
    pub fn polyline(&mut self, points: &[(f64, f64)], style: &Style) {
        let mut iter = points.iter();
        let Some(first) = iter.next() else { return };
        let mut d = format!("M{:.2} {:.2}", first.0, first.1);
        for p in iter {
            let _ = write!(d, "L{:.2} {:.2}", p.0, p.1);
        }
        let _ = writeln!(self.body, "<path d=\"{}\" {}/>", d, style.attributes());
    }

    /// Quadratic Bezier from `start` to `end` through control point `control`
    pub fn quadratic(&mut self, start: Point, control: Point, end: Point, style: &Style) {
        let _ = writeln!(
            self.body,
            "<path d=\"M{:.2} {:.2}Q{:.2} {:.2} {:.2} {:.2}\" stroke-linecap=\"butt\" {}/>",
            start.x(),
            start.y(),
            control.x(),
            control.y(),
            end.x(),
            end.y(),
            style.attributes()
        );
    }

    /// Text vertically centered on `y`
    pub fn text(&mut self, position: (f64, f64), content: &str, size: f64, color: &str, anchor: Anchor) {
        let _ = writeln!(
            self.body,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"{:.2}\" fill=\"{}\" text-anchor=\"{}\" dominant-baseline=\"central\">{}</text>",
            position.0,
            position.1,
            size,
            escape_xml(color),
            anchor.as_str(),
            escape_xml(content)
        );
    }

    /// Text rotated a quarter turn counter-clockwise around its position
    pub fn vertical_text(&mut self, position: (f64, f64), content: &str, size: f64, color: &str) {
        let _ = writeln!(
            self.body,
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{:.2}\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" transform=\"rotate(-90 {x:.2} {y:.2})\">{}</text>",
            size,
            escape_xml(color),
            escape_xml(content),
            x = position.0,
            y = position.1,
        );
    }

    /// Serialize the document
    pub fn finish(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"DejaVu Sans, Arial, sans-serif\">\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height
        )
    }
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let mut doc = SvgDocument::new(200, 100);
        doc.background("white");
        doc.circle((10.0, 20.0), 5.0, &Style::fill("#4897CA"));
        doc.text((10.0, 20.0), "FR", 12.0, "white", Anchor::Middle);
        let svg = doc.finish();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.contains("<circle cx=\"10.00\" cy=\"20.00\" r=\"5.00\" fill=\"#4897CA\"/>"));
        assert!(svg.contains(">FR</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_rings_skip_empty() {
        let mut doc = SvgDocument::new(10, 10);
        doc.rings(&[Vec::new()], &Style::fill("red"));
        assert!(!doc.finish().contains("<path"));

        doc.rings(
            &[vec![(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)], vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0)]],
            &Style::fill("red").with_stroke("gray", 1.0),
        );
        let svg = doc.finish();
        assert_eq!(svg.matches('Z').count(), 2);
        assert!(svg.contains("fill-rule=\"evenodd\""));
        assert!(svg.contains("stroke=\"gray\""));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("CO2 <kg> & \"t\""), "CO2 &lt;kg&gt; &amp; &quot;t&quot;");
    }
}
