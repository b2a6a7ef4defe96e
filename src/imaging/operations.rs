//! High-level image operations.
//!
//! Each function takes an in-memory buffer, applies one pipeline step and
//! hands back the result. Geometry comes from [`calculations`](super::calculations);
//! nothing here touches the filesystem.

use super::backend::BackendError;
use super::calculations::{
    calculate_centered_offset, calculate_fit_dimensions, calculate_framed_dimensions,
    calculate_logo_position, canvas_within_limits, is_dash_gap,
};
use super::color::Color;
use super::params::{Anchor, BorderSpec, BorderStyle, Margins, Orientation};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage, RgbaImage};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Rotate `image` so it displays upright. The canvas grows to fit, so
/// quarter turns swap width and height.
pub fn correct_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::Rotate180 => image.rotate180(),
        Orientation::Rotate90Cw => image.rotate90(),
        Orientation::Rotate270Cw => image.rotate270(),
    }
}

/// Scale `image` to fit inside `target` and center it on a canvas of
/// exactly that size, letterboxed with `fill`.
///
/// The result is always opaque RGB; any alpha channel is dropped.
pub fn resize_to_canvas(image: &DynamicImage, target: (u32, u32), fill: Color) -> Result<RgbImage> {
    let (width, height) = target;
    if width == 0 || height == 0 {
        return Err(BackendError::InvalidTargetSize { width, height });
    }
    if !canvas_within_limits(width as u64, height as u64) {
        return Err(BackendError::CanvasTooLarge {
            width: width as u64,
            height: height as u64,
        });
    }

    let (fit_w, fit_h) = calculate_fit_dimensions(image.dimensions(), target);
    let resized = image::imageops::resize(&image.to_rgb8(), fit_w, fit_h, FilterType::Lanczos3);

    let mut canvas = RgbImage::from_pixel(width, height, fill.to_rgb());
    let (x, y) = calculate_centered_offset(target, (fit_w, fit_h));
    image::imageops::replace(&mut canvas, &resized, x as i64, y as i64);
    Ok(canvas)
}

/// Alpha-blend `logo` onto `base` at the anchored position.
///
/// Returns the top-left corner used. Logo pixels with alpha 0 leave the
/// base untouched; anything hanging past the right or bottom edge is clipped.
pub fn composite_logo(
    base: &mut RgbImage,
    logo: &RgbaImage,
    anchor: Anchor,
    margins: &Margins,
) -> (u32, u32) {
    let (x, y) = calculate_logo_position(anchor, base.dimensions(), logo.dimensions(), margins);
    let (base_w, base_h) = base.dimensions();

    for (lx, ly, src) in logo.enumerate_pixels() {
        let alpha = src[3] as u32;
        if alpha == 0 {
            continue;
        }
        let (bx, by) = (x.saturating_add(lx), y.saturating_add(ly));
        if bx >= base_w || by >= base_h {
            continue;
        }
        let dst = base.get_pixel_mut(bx, by);
        for c in 0..3 {
            dst[c] = ((src[c] as u32 * alpha + dst[c] as u32 * (255 - alpha) + 127) / 255) as u8;
        }
    }

    (x, y)
}

/// Frame `image` with a border band of `spec.thickness` pixels on every side.
///
/// A thickness of zero or less returns the input unchanged. Fails with
/// [`BackendError::CanvasTooLarge`] when the framed canvas would exceed the
/// canvas limits.
pub fn add_border(image: RgbImage, spec: &BorderSpec) -> Result<RgbImage> {
    if spec.thickness <= 0 {
        return Ok(image);
    }
    let (w, h) = image.dimensions();
    let (framed_w, framed_h) = calculate_framed_dimensions((w, h), spec.thickness).ok_or(
        BackendError::CanvasTooLarge {
            width: w as u64 + 2 * spec.thickness as u64,
            height: h as u64 + 2 * spec.thickness as u64,
        },
    )?;
    let t = spec.thickness as u32;

    let mut framed = RgbImage::from_pixel(framed_w, framed_h, spec.color.to_rgb());
    image::imageops::replace(&mut framed, &image, t as i64, t as i64);

    if spec.style == BorderStyle::Dashed {
        perforate_border(&mut framed, t, spec.gap_color);
    }
    Ok(framed)
}

/// Paint the gap segments of a dashed border over an already filled band.
///
/// Top and bottom bands follow the pattern along x, left and right bands
/// along y; each band is covered across its full thickness. Corners belong
/// to two bands and may show shortened dashes.
fn perforate_border(framed: &mut RgbImage, thickness: u32, gap_color: Color) {
    let (w, h) = framed.dimensions();
    let gap = gap_color.to_rgb();

    for x in (0..w).filter(|&x| is_dash_gap(x)) {
        for d in 0..thickness {
            framed.put_pixel(x, d, gap);
            framed.put_pixel(x, h - 1 - d, gap);
        }
    }
    for y in (0..h).filter(|&y| is_dash_gap(y)) {
        for d in 0..thickness {
            framed.put_pixel(d, y, gap);
            framed.put_pixel(w - 1 - d, y, gap);
        }
    }
}
