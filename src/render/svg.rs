use std::f64::consts::PI;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub const HIGH_INTENSITY_COLOR: &str = "#FF5722";
pub const LOW_INTENSITY_COLOR: &str = "#2196F3";
const RING_BACKGROUND_COLOR: &str = "#ddd";
const LINE_WIDTH_RATIO: f64 = 0.1;
const GLYPH_RATIO: f64 = 0.6;

/// Ring geometry shared by the renderer and its callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub line_width: f64,
}

impl RingGeometry {
    pub fn new(width: f64, height: f64) -> Self {
        let line_width = width.min(height) * LINE_WIDTH_RATIO;
        Self {
            center_x: width / 2.0,
            center_y: height / 2.0,
            radius: width.min(height) / 2.0 - line_width,
            line_width,
        }
    }

    pub fn circumference(&self) -> f64 {
        2.0 * PI * self.radius
    }

    /// Dash offset that leaves `percent` of the ring visible.
    pub fn dash_offset(&self, percent: f64) -> f64 {
        self.circumference() * (1.0 - percent.clamp(0.0, 100.0) / 100.0)
    }
}

fn fire_path(ring: &RingGeometry) -> String {
    let fire_width = ring.radius * GLYPH_RATIO;
    let fire_height = ring.radius * 0.8;
    let left = ring.center_x - fire_width / 2.0;
    let top = ring.center_y - fire_height / 2.0;
    let shoulder = top + fire_height * 0.7;
    let bottom = top + fire_height;
    let middle = left + fire_width / 2.0;

    format!(
        r#"<path d="M{left},{shoulder}
    Q{},{} {middle},{top}
    Q{},{} {},{shoulder}
    Q{},{bottom} {middle},{bottom}
    Q{},{bottom} {left},{shoulder}
    Z" fill="{HIGH_INTENSITY_COLOR}" stroke="white" stroke-width="{}"/>"#,
        left + fire_width * 0.4,
        top + fire_height * 0.4,
        left + fire_width * 0.6,
        top + fire_height * 0.4,
        left + fire_width,
        left + fire_width * 0.7,
        left + fire_width * 0.3,
        ring.line_width * 0.2,
    )
}

fn snowflake_path(ring: &RingGeometry) -> String {
    let size = ring.radius * GLYPH_RATIO;
    let left = ring.center_x - size / 2.0;
    let top = ring.center_y - size / 2.0;
    let (cx, cy) = (ring.center_x, ring.center_y);
    let near_x = left + size * 0.3;
    let far_x = left + size * 0.7;
    let near_y = top + size * 0.3;
    let far_y = top + size * 0.7;

    format!(
        r#"<path d="M{cx},{top}
    L{cx},{}
    M{left},{cy}
    L{},{cy}
    M{near_x},{near_y}
    L{far_x},{far_y}
    M{near_x},{far_y}
    L{far_x},{near_y}"
    stroke="{LOW_INTENSITY_COLOR}" stroke-width="{}" fill="none"/>"#,
        top + size,
        left + size,
        ring.line_width * 0.2,
    )
}

/// Renders the circular progress image for one frame.
///
/// The foreground ring starts at twelve o'clock and covers `percent` of the
/// circumference. High intensity draws an orange ring around a flame, low
/// intensity a blue ring around a snowflake. Output depends only on the
/// arguments.
pub fn render(percent: f64, width: f64, height: f64, is_high_intensity: bool) -> String {
    let ring = RingGeometry::new(width, height);
    let RingGeometry {
        center_x: cx,
        center_y: cy,
        radius: r,
        line_width,
    } = ring;

    let background = format!(
        r#"<circle cx="{cx}" cy="{cy}" r="{r}" stroke="{RING_BACKGROUND_COLOR}" stroke-width="{line_width}" fill="black"/>"#
    );

    let color = if is_high_intensity {
        HIGH_INTENSITY_COLOR
    } else {
        LOW_INTENSITY_COLOR
    };
    let foreground = format!(
        r#"<circle cx="{cx}" cy="{cy}" r="{r}" stroke="{color}" stroke-width="{line_width}" fill="none"
    stroke-dasharray="{}" stroke-dashoffset="{}" transform="rotate(-90 {cx} {cy})"/>"#,
        ring.circumference(),
        ring.dash_offset(percent),
    );

    let icon = if is_high_intensity {
        fire_path(&ring)
    } else {
        snowflake_path(&ring)
    };

    format!(
        r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
    {background}
    {foreground}
    {icon}
  </svg>"#
    )
}

/// Embeds SVG markup as an image URI.
pub fn data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
