//! Image I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three places the pipeline touches
//! files: decode, read the orientation tag, and encode. Pixel operations in
//! [`operations`](super::operations) work on in-memory buffers and never
//! go through the backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use a mock that
//! serves synthetic images and records every call.

use super::params::Quality;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("Invalid target size {width}x{height}: both dimensions must be at least 1 pixel")]
    InvalidTargetSize { width: u32, height: u32 },
    #[error("Canvas of {width}x{height} px exceeds the supported size")]
    CanvasTooLarge { width: u64, height: u64 },
}

/// Trait for image I/O backends.
pub trait ImageBackend {
    /// Decode an image file into memory.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Raw EXIF orientation code (tag 0x0112), if the file carries one.
    ///
    /// Missing or unreadable metadata is `None`, never an error.
    fn read_orientation(&self, path: &Path) -> Option<u32>;

    /// Encode `image` to `path`. The format follows the file extension.
    fn save(&self, image: &RgbImage, path: &Path, quality: Quality) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// What the mock returns when asked to decode a path.
    #[derive(Debug, Clone)]
    pub enum MockSource {
        Image {
            width: u32,
            height: u32,
            orientation: Option<u32>,
            alpha: bool,
        },
        Corrupt,
    }

    /// Mock backend that serves synthetic images and records operations.
    #[derive(Default)]
    pub struct MockBackend {
        pub sources: Mutex<HashMap<String, MockSource>>,
        pub operations: Mutex<Vec<RecordedOp>>,
        pub fail_saves: Mutex<Vec<String>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode(String),
        ReadOrientation(String),
        Save {
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_string()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_image(self, path: impl AsRef<Path>, width: u32, height: u32) -> Self {
            self.insert(
                path.as_ref(),
                MockSource::Image {
                    width,
                    height,
                    orientation: None,
                    alpha: false,
                },
            )
        }

        pub fn with_oriented_image(
            self,
            path: impl AsRef<Path>,
            width: u32,
            height: u32,
            orientation: u32,
        ) -> Self {
            self.insert(
                path.as_ref(),
                MockSource::Image {
                    width,
                    height,
                    orientation: Some(orientation),
                    alpha: false,
                },
            )
        }

        /// A fully opaque RGBA image, suitable as a logo.
        pub fn with_logo(self, path: impl AsRef<Path>, width: u32, height: u32) -> Self {
            self.insert(
                path.as_ref(),
                MockSource::Image {
                    width,
                    height,
                    orientation: None,
                    alpha: true,
                },
            )
        }

        pub fn with_corrupt(self, path: impl AsRef<Path>) -> Self {
            self.insert(path.as_ref(), MockSource::Corrupt)
        }

        pub fn with_failing_save(self, path: impl AsRef<Path>) -> Self {
            self.fail_saves.lock().unwrap().push(key(path.as_ref()));
            self
        }

        fn insert(self, path: &Path, source: MockSource) -> Self {
            self.sources.lock().unwrap().insert(key(path), source);
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn saves(&self) -> Vec<RecordedOp> {
            self.get_operations()
                .into_iter()
                .filter(|op| matches!(op, RecordedOp::Save { .. }))
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(key(path)));

            match self.sources.lock().unwrap().get(&key(path)) {
                Some(MockSource::Image {
                    width,
                    height,
                    alpha: false,
                    ..
                }) => Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                    *width,
                    *height,
                    image::Rgb([90, 120, 150]),
                ))),
                Some(MockSource::Image {
                    width,
                    height,
                    alpha: true,
                    ..
                }) => Ok(DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
                    *width,
                    *height,
                    image::Rgba([255, 0, 0, 255]),
                ))),
                Some(MockSource::Corrupt) => Err(BackendError::ProcessingFailed(format!(
                    "Failed to decode {}: corrupt data",
                    path.display()
                ))),
                None => Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no mock image for {}", path.display()),
                ))),
            }
        }

        fn read_orientation(&self, path: &Path) -> Option<u32> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::ReadOrientation(key(path)));

            match self.sources.lock().unwrap().get(&key(path)) {
                Some(MockSource::Image { orientation, .. }) => *orientation,
                _ => None,
            }
        }

        fn save(
            &self,
            image: &RgbImage,
            path: &Path,
            quality: Quality,
        ) -> Result<(), BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Save {
                output: key(path),
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });
            if self.fail_saves.lock().unwrap().contains(&key(path)) {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only destination",
                )));
            }
            Ok(())
        }
    }

    #[test]
    fn mock_decodes_registered_image() {
        let backend = MockBackend::new().with_image("/src/a.jpg", 80, 60);
        let img = backend.decode(Path::new("/src/a.jpg")).unwrap();
        assert_eq!((img.width(), img.height()), (80, 60));

        let ops = backend.get_operations();
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/src/a.jpg"));
    }

    #[test]
    fn mock_corrupt_and_unknown_fail() {
        let backend = MockBackend::new().with_corrupt("/src/bad.jpg");
        assert!(matches!(
            backend.decode(Path::new("/src/bad.jpg")),
            Err(BackendError::ProcessingFailed(_))
        ));
        assert!(matches!(
            backend.decode(Path::new("/src/missing.jpg")),
            Err(BackendError::Io(_))
        ));
    }

    #[test]
    fn mock_reports_orientation() {
        let backend = MockBackend::new()
            .with_oriented_image("/src/a.jpg", 10, 20, 6)
            .with_image("/src/b.jpg", 10, 20);
        assert_eq!(backend.read_orientation(Path::new("/src/a.jpg")), Some(6));
        assert_eq!(backend.read_orientation(Path::new("/src/b.jpg")), None);
    }

    #[test]
    fn mock_records_save() {
        let backend = MockBackend::new();
        backend
            .save(
                &RgbImage::new(30, 40),
                Path::new("/out/a.jpg"),
                Quality::new(95),
            )
            .unwrap();

        assert_eq!(
            backend.saves(),
            vec![RecordedOp::Save {
                output: "/out/a.jpg".to_string(),
                width: 30,
                height: 40,
                quality: 95,
            }]
        );
    }
}
