//! Progress ring layout.
//!
//! Pure geometry for drawing the countdown ring; no state of its own. The
//! arc starts at 12 o'clock and sweeps clockwise in proportion to the
//! remaining fraction. Angles are degrees clockwise from 12 o'clock in a
//! y-down coordinate space.

use serde::{Deserialize, Serialize};

/// Colors and stroke for one ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingStyle {
    pub progress_color: String,
    pub track_color: String,
    pub stroke_thickness: f32,
}

impl RingStyle {
    /// `progress_color` as RGB, if it is a `#RRGGBB` string.
    pub fn progress_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.progress_color)
    }

    /// `track_color` as RGB, if it is a `#RRGGBB` string.
    pub fn track_rgb(&self) -> Option<(u8, u8, u8)> {
        parse_hex_color(&self.track_color)
    }
}

/// Parse a `#RRGGBB` color.
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Drawing area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// What to draw over the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RingFill {
    /// Track only.
    Empty,
    /// Closed circle; avoids a seam where an arc would meet itself.
    Full,
    Arc { start_deg: f32, sweep_deg: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingLayout {
    pub center_x: f32,
    pub center_y: f32,
    /// Diameter of the stroke's center line.
    pub diameter: f32,
    pub style: RingStyle,
    pub fill: RingFill,
}

impl RingLayout {
    pub fn radius(&self) -> f32 {
        self.diameter / 2.0
    }

    /// Point on the stroke's center line at `angle_deg`.
    pub fn point_at(&self, angle_deg: f32) -> (f32, f32) {
        let theta = angle_deg.to_radians();
        let r = self.radius();
        (self.center_x + r * theta.sin(), self.center_y - r * theta.cos())
    }
}

/// Lay out a ring inside `bounds` for `progress` in `[0, 1]`.
///
/// The ring is the largest circle that fits, inset by half the stroke so the
/// stroke stays inside the bounds.
pub fn layout_ring(progress: f64, bounds: Bounds, style: &RingStyle) -> RingLayout {
    let size = bounds.width.min(bounds.height).max(0.0);
    let diameter = (size - style.stroke_thickness).max(0.0);

    let fill = if progress.is_nan() || progress <= 0.0 {
        RingFill::Empty
    } else if progress >= 1.0 {
        RingFill::Full
    } else {
        RingFill::Arc {
            start_deg: 0.0,
            sweep_deg: (360.0 * progress) as f32,
        }
    };

    RingLayout {
        center_x: bounds.x + bounds.width / 2.0,
        center_y: bounds.y + bounds.height / 2.0,
        diameter,
        style: style.clone(),
        fill,
    }
}

/// Number of filled cells out of `width` for `progress`.
pub fn bar_cells(progress: f64, width: usize) -> usize {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    ((p * width as f64).round() as usize).min(width)
}

/// Single-line text rendering of the remaining fraction.
pub fn text_bar(progress: f64, width: usize) -> String {
    let filled = bar_cells(progress, width);
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.extend(std::iter::repeat('#').take(filled));
    bar.extend(std::iter::repeat('-').take(width - filled));
    bar.push(']');
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> RingStyle {
        RingStyle {
            progress_color: "#E53935".into(),
            track_color: "#333333".into(),
            stroke_thickness: 10.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn fits_largest_circle_inside_stroke() {
        let layout = layout_ring(0.5, Bounds::new(0.0, 0.0, 200.0, 120.0), &style());
        assert_eq!(layout.diameter, 110.0);
        assert_eq!((layout.center_x, layout.center_y), (100.0, 60.0));
    }

    #[test]
    fn zero_progress_draws_track_only() {
        let layout = layout_ring(0.0, Bounds::new(0.0, 0.0, 100.0, 100.0), &style());
        assert_eq!(layout.fill, RingFill::Empty);
        let layout = layout_ring(-0.2, Bounds::new(0.0, 0.0, 100.0, 100.0), &style());
        assert_eq!(layout.fill, RingFill::Empty);
    }

    #[test]
    fn full_progress_draws_closed_circle() {
        let layout = layout_ring(1.0, Bounds::new(0.0, 0.0, 100.0, 100.0), &style());
        assert_eq!(layout.fill, RingFill::Full);
    }

    #[test]
    fn partial_progress_sweeps_clockwise_from_top() {
        let layout = layout_ring(0.25, Bounds::new(0.0, 0.0, 100.0, 100.0), &style());
        let RingFill::Arc { start_deg, sweep_deg } = layout.fill else {
            panic!("expected arc, got {:?}", layout.fill);
        };
        assert_eq!(start_deg, 0.0);
        assert!(approx(sweep_deg, 90.0));

        let (x, y) = layout.point_at(start_deg);
        assert!(approx(x, 50.0) && approx(y, 5.0));
        let (x, y) = layout.point_at(start_deg + sweep_deg);
        assert!(approx(x, 95.0) && approx(y, 50.0));
    }

    #[test]
    fn tiny_bounds_never_go_negative() {
        let layout = layout_ring(0.5, Bounds::new(0.0, 0.0, 4.0, 4.0), &style());
        assert_eq!(layout.diameter, 0.0);
    }

    #[test]
    fn text_bar_fills_proportionally() {
        assert_eq!(text_bar(1.0, 10), "[##########]");
        assert_eq!(text_bar(0.0, 10), "[----------]");
        assert_eq!(text_bar(0.5, 10), "[#####-----]");
        assert_eq!(text_bar(f64::NAN, 4), "[----]");
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#E53935"), Some((0xE5, 0x39, 0x35)));
        assert_eq!(parse_hex_color("#1e88e5"), Some((0x1E, 0x88, 0xE5)));
        assert_eq!(parse_hex_color("E53935"), None);
        assert_eq!(parse_hex_color("#E539"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(style().track_rgb(), Some((0x33, 0x33, 0x33)));
    }
}
