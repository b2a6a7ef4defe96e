//! Pure calculation functions for print sizes, placement and border patterns.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Anchor, Margins};

/// Centimeters per inch.
const CM_PER_INCH: f64 = 2.54;

/// Length of one painted dash along a dashed border edge, in pixels.
pub const DASH_LENGTH: u32 = 5;

/// Distance between the starts of two consecutive dashes, in pixels.
pub const DASH_PERIOD: u32 = 10;

/// Longest side a canvas may have. Baseline JPEG cannot encode more.
pub const MAX_CANVAS_EDGE: u32 = 65_535;

/// Largest canvas area, in pixels, the pipeline will allocate.
pub const MAX_CANVAS_PIXELS: u64 = 250_000_000;

/// Convert a physical length in centimeters to whole pixels at `dpi`.
///
/// Truncates toward zero: 10 cm at 300 dpi is 1181.1 px, so 1181.
///
/// ```
/// # use photo_stamp::imaging::length_to_pixels;
/// assert_eq!(length_to_pixels(10.0, 300), 1181);
/// assert_eq!(length_to_pixels(15.0, 72), 425);
/// ```
pub fn length_to_pixels(length_cm: f64, dpi: u32) -> u32 {
    (length_cm * dpi as f64 / CM_PER_INCH).floor() as u32
}

/// Calculate the size of `source` scaled to fit inside `target`.
///
/// Aspect ratio is preserved and one edge matches the target. Small sources
/// are scaled *up*; the result never exceeds the target box on either axis.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `target` - Bounding box (width, height)
///
/// # Returns
/// * `(width, height)` - Scaled dimensions, each at least 1
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);
    let (tgt_w, tgt_h) = target;

    let scale = (tgt_w as f64 / src_w).min(tgt_h as f64 / src_h);
    let w = ((src_w * scale).round() as u32).clamp(1, tgt_w.max(1));
    let h = ((src_h * scale).round() as u32).clamp(1, tgt_h.max(1));
    (w, h)
}

/// Top-left offset that centers `content` on `canvas` (floor division).
pub fn calculate_centered_offset(canvas: (u32, u32), content: (u32, u32)) -> (u32, u32) {
    (
        canvas.0.saturating_sub(content.0) / 2,
        canvas.1.saturating_sub(content.1) / 2,
    )
}

/// Compute where the logo's top-left corner goes on the base canvas.
///
/// Origin is the top-left corner, x grows right and y grows down. The
/// vertical offset is added for every anchor. The result is clamped at zero
/// on both axes but not against the right/bottom edge: a logo bigger than
/// the free space hangs off the canvas and gets clipped when composited.
pub fn calculate_logo_position(
    anchor: Anchor,
    base: (u32, u32),
    logo: (u32, u32),
    margins: &Margins,
) -> (u32, u32) {
    let (base_w, base_h) = (base.0 as i64, base.1 as i64);
    let (logo_w, logo_h) = (logo.0 as i64, logo.1 as i64);
    let offset = margins.vertical_offset as i64;

    let right_x = base_w - logo_w - margins.right as i64;
    let left_x = margins.left as i64;
    let bottom_y = base_h - logo_h - margins.bottom as i64 + offset;
    let top_y = margins.top as i64 + offset;

    let (x, y) = match anchor {
        Anchor::BottomRight => (right_x, bottom_y),
        Anchor::BottomLeft => (left_x, bottom_y),
        Anchor::TopRight => (right_x, top_y),
        Anchor::TopLeft => (left_x, top_y),
        Anchor::Center => (
            (base_w - logo_w).div_euclid(2),
            (base_h - logo_h).div_euclid(2) + offset,
        ),
    };

    (x.max(0) as u32, y.max(0) as u32)
}

/// Whether position `pos` along a dashed edge falls in a gap.
///
/// Every [`DASH_PERIOD`] pixels the first [`DASH_LENGTH`] keep the border
/// color and the rest are painted with the gap color.
pub fn is_dash_gap(pos: u32) -> bool {
    pos % DASH_PERIOD >= DASH_LENGTH
}

/// Whether a `width` x `height` canvas stays within [`MAX_CANVAS_EDGE`] and
/// [`MAX_CANVAS_PIXELS`].
pub fn canvas_within_limits(width: u64, height: u64) -> bool {
    width <= MAX_CANVAS_EDGE as u64
        && height <= MAX_CANVAS_EDGE as u64
        && width * height <= MAX_CANVAS_PIXELS
}

/// Size of `image` after adding a border band of `thickness` on every side.
///
/// Returns `None` when the framed canvas would exceed the canvas limits.
/// A thickness of zero or less leaves the size unchanged.
pub fn calculate_framed_dimensions(image: (u32, u32), thickness: i32) -> Option<(u32, u32)> {
    let t = thickness.max(0) as u64;
    let width = image.0 as u64 + 2 * t;
    let height = image.1 as u64 + 2 * t;
    canvas_within_limits(width, height).then_some((width as u32, height as u32))
}
