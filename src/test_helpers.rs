//! Shared test utilities for the photo-stamp test suite.
//!
//! Writes small synthetic image files so backend, layout and pipeline tests
//! can run against real encoders without shipping fixture binaries.
//! `tests/pipeline.rs` includes this file by path, so it must only depend
//! on `image`, `tempfile` and std, never on `crate::`.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_source_dir(&["a.jpg", "b.png", "notes.txt"]);
//! jpeg_with_orientation(&tmp.path().join("c.jpg"), 40, 30, 6);
//! ```

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Image files
// =========================================================================

/// Gradient RGB pixels, so resizes and rotations produce non-uniform output.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// Write a baseline JPEG with a gradient and no metadata.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

/// Write a solid red RGBA PNG with the given alpha on every pixel.
pub fn create_test_png(path: &Path, width: u32, height: u32, alpha: u8) {
    RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, alpha]))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Write a JPEG carrying an EXIF orientation tag.
///
/// The `image` encoder writes no EXIF, so an APP1 segment with a one-entry
/// big-endian TIFF IFD is spliced in right after the SOI marker.
pub fn jpeg_with_orientation(path: &Path, width: u32, height: u32, orientation: u16) {
    let mut encoded = Vec::new();
    gradient(width, height)
        .write_to(
            &mut std::io::Cursor::new(&mut encoded),
            image::ImageFormat::Jpeg,
        )
        .unwrap();
    assert_eq!(&encoded[..2], &[0xFF, 0xD8], "encoder must start with SOI");

    let mut payload = Vec::new();
    payload.extend_from_slice(b"Exif\0\0");
    // TIFF header: big-endian, magic 42, first IFD at offset 8
    payload.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
    // IFD0 with a single entry: tag 0x0112, type SHORT, count 1
    payload.extend_from_slice(&1u16.to_be_bytes());
    payload.extend_from_slice(&0x0112u16.to_be_bytes());
    payload.extend_from_slice(&3u16.to_be_bytes());
    payload.extend_from_slice(&1u32.to_be_bytes());
    payload.extend_from_slice(&orientation.to_be_bytes());
    payload.extend_from_slice(&[0, 0]);
    // no next IFD
    payload.extend_from_slice(&0u32.to_be_bytes());

    let mut out = Vec::with_capacity(encoded.len() + payload.len() + 4);
    out.extend_from_slice(&encoded[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&encoded[2..]);
    std::fs::write(path, out).unwrap();
}

/// Write bytes that carry an image extension but decode as nothing.
pub fn write_corrupt(path: &Path) {
    std::fs::write(path, b"this is not an image").unwrap();
}

// =========================================================================
// Directory setup
// =========================================================================

/// Create a temp source directory populated by file extension: image
/// extensions get a 64x48 image, anything else a text file.
pub fn setup_source_dir(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        let path = tmp.path().join(name);
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg" | "jpeg") => create_test_jpeg(&path, 64, 48),
            Some("png" | "bmp") => gradient(64, 48).save(&path).unwrap(),
            _ => std::fs::write(&path, "not a photo").unwrap(),
        }
    }
    tmp
}

#[test]
fn orientation_jpeg_still_decodes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("o.jpg");
    jpeg_with_orientation(&path, 20, 10, 8);
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (20, 10));
}
