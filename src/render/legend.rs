//! Vertical colorbar legend.

use crate::colormaps::{to_hex, ColorScale, Colormap};
use crate::render::layout::Rect;
use crate::render::svg::{Anchor, Style, SvgDocument};

/// Sizes (in pixels) used to draw a colorbar
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarStyle {
    /// Number of flat color bands stacked from bottom to top
    pub bands: usize,
    pub tick_length: f64,
    pub tick_font_size: f64,
    pub label_font_size: f64,
    pub outline_width: f64,
    pub max_ticks: usize,
}

/// Draw a colorbar for `colormap` over `scale` inside `rect`, with tick labels on the
/// right and an optional rotated label beyond them.
pub fn draw_colorbar(
    doc: &mut SvgDocument,
    rect: &Rect,
    colormap: &dyn Colormap,
    scale: &ColorScale,
    style: &ColorbarStyle,
    label: Option<&str>,
) {
    let bands = style.bands.max(1);
    let band_height = rect.height / bands as f64;

    doc.begin_group("colorbar");
    for i in 0..bands {
        let t = (i as f64 + 0.5) / bands as f64;
        let color = to_hex(colormap.map_normalized(t));
        // Overlap by a pixel fraction to avoid hairline gaps between bands
        let band = Rect::new(
            rect.x,
            rect.bottom() - (i + 1) as f64 * band_height,
            rect.width,
            band_height + 0.5,
        );
        doc.rect(&band, &Style::fill(&color));
    }
    doc.rect(rect, &Style::stroke("black", style.outline_width));

    let ticks = nice_ticks(scale.min, scale.max, style.max_ticks);
    let step = if ticks.len() > 1 { ticks[1] - ticks[0] } else { 0.0 };
    let mut widest = 0usize;
    for tick in &ticks {
        let y = if scale.max > scale.min {
            rect.bottom() - scale.normalize(*tick) * rect.height
        } else {
            rect.y + rect.height / 2.0
        };
        doc.polyline(
            &[(rect.right(), y), (rect.right() + style.tick_length, y)],
            &Style::stroke("black", style.outline_width),
        );
        let text = format_tick(*tick, step);
        widest = widest.max(text.chars().count());
        doc.text(
            (rect.right() + style.tick_length * 2.0, y),
            &text,
            style.tick_font_size,
            "black",
            Anchor::Start,
        );
    }

    if let Some(label) = label {
        let x = rect.right()
            + style.tick_length * 3.0
            + widest as f64 * style.tick_font_size * 0.6
            + style.label_font_size;
        doc.vertical_text((x, rect.y + rect.height / 2.0), label, style.label_font_size, "black");
    }
    doc.end_group();
}

fn nice_number(value: f64, round: bool) -> f64 {
    let exponent = value.log10().floor();
    let fraction = value / 10f64.powf(exponent);
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * 10f64.powf(exponent)
}

/// Round tick values (multiples of 1, 2 or 5 times a power of ten) within `[min, max]`
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    if max == min || max_ticks < 2 {
        return vec![min];
    }

    let span = max - min;
    if !span.is_finite() {
        return vec![min, max];
    }
    let range = nice_number(span, false);
    let step = nice_number(range / (max_ticks - 1) as f64, true);
    if !(step.is_finite() && step > 0.0) {
        return vec![min, max];
    }
    let first = (min / step).ceil() * step;

    // Rounding shrinks the step at most 1.5 times, so fewer ticks than this can fit
    let mut ticks: Vec<f64> = Vec::with_capacity(max_ticks);
    for i in 0..2 * max_ticks {
        let tick = first + i as f64 * step;
        if tick > max + step * 1e-9 {
            break;
        }
        // Snap values like 0.30000000000000004 and -0
        let snapped = (tick / step).round() * step;
        let value = if snapped == 0.0 { 0.0 } else { snapped };
        if ticks.last().map_or(true, |last| value > *last) {
            ticks.push(value);
        }
    }
    ticks
}

/// Format a tick with as many decimals as the tick spacing needs
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-(step.log10() + 1e-9).floor()) as usize
    } else {
        0
    };
    let text = format!("{:.*}", decimals, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormaps::get_discrete_colormap;

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 100.0, 6), vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(nice_ticks(13.0, 97.0, 6), vec![20.0, 40.0, 60.0, 80.0]);
        assert_eq!(nice_ticks(5.0, 5.0, 6), vec![5.0]);
        assert!(nice_ticks(2.0, 1.0, 6).is_empty());

        let small = nice_ticks(0.0, 0.6, 6);
        assert_eq!(small.len(), 4);
        assert!((small[1] - 0.2).abs() < 1e-12);
        assert!((small[3] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_ticks_stay_in_range() {
        let ticks = nice_ticks(-37.5, 1234.0, 7);
        assert!(ticks.len() >= 2);
        assert!(ticks.iter().all(|t| *t >= -37.5 && *t <= 1234.0));
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_ticks_for_overflowing_range_terminate() {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            tx.send(nice_ticks(-1e308, 1e308, 6)).unwrap();
        });
        let ticks = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert!(!ticks.is_empty() && ticks.len() <= 7);
        assert!(ticks.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_ticks_bounded_when_step_is_below_precision() {
        let min: f64 = 1e300;
        let max = f64::from_bits(min.to_bits() + 4);
        let ticks = nice_ticks(min, max, 6);
        assert!(ticks.len() <= 12);
        assert!(ticks.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(20.0, 20.0), "20");
        assert_eq!(format_tick(0.3, 0.1), "0.3");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(-0.0, 0.1), "0.0");
    }

    #[test]
    fn test_draw_colorbar_bands_and_ticks() {
        let mut doc = SvgDocument::new(100, 400);
        let cmap = get_discrete_colormap("RdYlGn_r", 25).unwrap();
        let scale = ColorScale::new(0.0, 100.0).unwrap();
        let style = ColorbarStyle {
            bands: 25,
            tick_length: 4.0,
            tick_font_size: 10.0,
            label_font_size: 12.0,
            outline_width: 1.0,
            max_ticks: 6,
        };
        draw_colorbar(&mut doc, &Rect::new(10.0, 50.0, 10.0, 300.0), &cmap, &scale, &style, Some("Value"));
        let svg = doc.finish();

        // 25 bands plus the outline
        assert_eq!(svg.matches("<rect").count(), 26);
        assert!(svg.contains(">100</text>"));
        assert!(svg.contains(">0</text>"));
        assert!(svg.contains("rotate(-90"));
    }
}
