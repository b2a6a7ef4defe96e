//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, BMP) |
//! | **Orientation** | `kamadak-exif` tag 0x0112 |
//! | **Resize → canvas** | Lanczos3 + `imageops::replace` onto a filled canvas |
//! | **Logo** | per-pixel alpha blend |
//! | **Border** | solid band, optionally perforated into dashes |
//! | **Encode** | `JpegEncoder` at the configured quality, lossless for PNG/BMP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Color**: `#rrggbb` parsing and formatting
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: In-memory pixel steps of the pipeline

pub mod backend;
mod calculations;
pub mod color;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::{
    DASH_LENGTH, DASH_PERIOD, MAX_CANVAS_EDGE, MAX_CANVAS_PIXELS, calculate_centered_offset,
    calculate_fit_dimensions, calculate_framed_dimensions, calculate_logo_position,
    canvas_within_limits, is_dash_gap, length_to_pixels,
};
pub use color::{Color, ColorError, color_to_hex, parse_color};
pub use operations::{add_border, composite_logo, correct_orientation, resize_to_canvas};
pub use params::{Anchor, BorderSpec, BorderStyle, Margins, Orientation, Quality};
pub use rust_backend::{RustBackend, is_supported, supported_input_extensions};
