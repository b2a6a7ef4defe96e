//! Pure Rust image backend — no system libraries.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP) | `image::ImageReader` |
//! | Orientation tag | `kamadak-exif` (`exif::Reader::read_from_container`) |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode PNG, BMP | `ImageBuffer::write_to` (lossless, quality unused) |

use super::backend::{BackendError, ImageBackend};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions the pipeline accepts, with the format used to write them back.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled() && fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the image file extensions that can be both decoded and re-encoded.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether the file extension is one the pipeline processes (case-insensitive).
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    PHOTO_CANDIDATES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        .map(|(_, fmt)| *fmt)
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

fn read_exif_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    let mut reader = std::io::BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?
        .value
        .get_uint(0)
}

/// Encode to `path`, inferring the format from its extension.
///
/// The whole file is encoded in memory before anything is written, so a
/// failed encode leaves an existing file at `path` as it was.
fn save_image(img: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
    let format = output_format(path).ok_or_else(|| {
        BackendError::ProcessingFailed(format!("Unsupported output format: {}", path.display()))
    })?;

    let mut encoded = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut encoded, quality.value() as u8);
            img.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))?;
        }
        _ => img
            .write_to(&mut Cursor::new(&mut encoded), format)
            .map_err(|e| {
                BackendError::ProcessingFailed(format!("{:?} encode failed: {}", format, e))
            })?,
    }
    std::fs::write(path, encoded).map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        load_image(path)
    }

    fn read_orientation(&self, path: &Path) -> Option<u32> {
        read_exif_orientation(path)
    }

    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError> {
        save_image(image, path, quality)
    }
}
