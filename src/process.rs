//! Batch processing of a photo folder.
//!
//! Every file in the source folder runs through the same fixed sequence,
//! one at a time, in file-name order:
//!
//! ```text
//! decode → correct orientation → resize onto canvas → composite logo
//!        → border (optional) → encode into the destination folder
//! ```
//!
//! Files with an unsupported extension are recorded as skipped. A failure in
//! any step is recorded against that file and the batch moves on; only a
//! missing path, an unreadable logo or an unreadable source folder stop the
//! run. Once every file is done, the successful outputs are optionally laid
//! out into a PDF contact sheet (see [`crate::layout`]).
//!
//! Progress is reported over an optional `mpsc` channel so the CLI can print
//! while the batch runs; the final [`BatchReport`] carries the full result.

use crate::config::{ConfigError, PathsConfig, ProcessingConfig};
use crate::imaging::{
    BackendError, ImageBackend, Orientation, RustBackend, add_border, composite_logo,
    correct_orientation, is_supported, resize_to_canvas,
};
use crate::layout::{self, PageGeometry, PagePlan};
use image::RgbaImage;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No {0} given: pass it on the command line or set it under [paths]")]
    ConfigurationMissing(&'static str),
    #[error("Failed to load logo {}: {source}", path.display())]
    LogoLoadFailed {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Where a file is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Pending,
    Decoding,
    CorrectingOrientation,
    Resizing,
    CompositingLogo,
    Bordering,
    Encoding,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Pending => "pending",
            Stage::Decoding => "decoding",
            Stage::CorrectingOrientation => "correcting orientation",
            Stage::Resizing => "resizing",
            Stage::CompositingLogo => "compositing logo",
            Stage::Bordering => "bordering",
            Stage::Encoding => "encoding",
            Stage::Done => "done",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    /// Extension is not one of the supported image formats.
    Skipped,
    Failed { stage: Stage, reason: String },
}

/// Result for one file of the source folder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileResult {
    pub source: PathBuf,
    /// Written file; `None` unless the outcome is a success.
    pub output: Option<PathBuf>,
    pub outcome: Outcome,
}

/// What happened to the PDF contact sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DocumentOutcome {
    Written {
        path: PathBuf,
        pages: usize,
        images_per_page: usize,
    },
    Failed {
        path: PathBuf,
        reason: String,
    },
}

/// Everything a run produced, in processing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub files: Vec<FileResult>,
    /// `None` when export was disabled or nothing was processed.
    pub document: Option<DocumentOutcome>,
}

impl BatchReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }

    pub fn processed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Success))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Written files, in processing order.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        self.files.iter().filter_map(|f| f.output.clone()).collect()
    }
}

/// Progress events emitted while the batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Started {
        total: usize,
        source: PathBuf,
    },
    FileFinished {
        /// 1-based position in the listing.
        index: usize,
        total: usize,
        file: String,
        outcome: Outcome,
    },
    /// Photos are too wide to share a page; the sheet gets one per page.
    LayoutFallback { image_width_cm: f64 },
    ExportStarted { images: usize },
}

/// Resolved input and output locations for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPaths {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub logo: PathBuf,
}

impl BatchPaths {
    pub fn from_config(paths: &PathsConfig) -> Result<Self, ProcessError> {
        let require = |value: &Option<PathBuf>, name| {
            value.clone().ok_or(ProcessError::ConfigurationMissing(name))
        };
        Ok(Self {
            source: require(&paths.source, "source folder")?,
            destination: require(&paths.destination, "destination folder")?,
            logo: require(&paths.logo, "logo file")?,
        })
    }
}

/// Files directly inside `dir`, sorted by file name. Subdirectories are ignored.
pub fn list_source_files(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Decode the logo once for the whole run.
pub fn load_logo(backend: &impl ImageBackend, path: &Path) -> Result<RgbaImage, ProcessError> {
    backend
        .decode(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| ProcessError::LogoLoadFailed {
            path: path.to_path_buf(),
            source,
        })
}

pub fn process(
    paths: &BatchPaths,
    config: &ProcessingConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, paths, config, progress)
}

/// Process a folder using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    paths: &BatchPaths,
    config: &ProcessingConfig,
    progress: Option<Sender<ProcessEvent>>,
) -> Result<BatchReport, ProcessError> {
    let emit = |event: ProcessEvent| {
        if let Some(tx) = &progress {
            tx.send(event).ok();
        }
    };

    let logo = load_logo(backend, &paths.logo)?;
    let files = list_source_files(&paths.source)?;
    std::fs::create_dir_all(&paths.destination)?;

    let total = files.len();
    info!(
        "processing {} files from {} into {} at {}x{} px",
        total,
        paths.source.display(),
        paths.destination.display(),
        config.width_px,
        config.height_px
    );
    emit(ProcessEvent::Started {
        total,
        source: paths.source.clone(),
    });

    let mut results = Vec::with_capacity(total);
    for (i, source) in files.into_iter().enumerate() {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = paths.destination.join(&file_name);

        let (output, outcome) = if !is_supported(&source) {
            debug!("{}: skipped, unsupported extension", file_name);
            (None, Outcome::Skipped)
        } else {
            match process_file(backend, &source, &output, &logo, config) {
                Ok(()) => (Some(output), Outcome::Success),
                Err((stage, err)) => {
                    warn!("{}: failed while {}: {}", file_name, stage, err);
                    let reason = err.to_string();
                    (None, Outcome::Failed { stage, reason })
                }
            }
        };

        emit(ProcessEvent::FileFinished {
            index: i + 1,
            total,
            file: file_name,
            outcome: outcome.clone(),
        });
        results.push(FileResult {
            source,
            output,
            outcome,
        });
    }

    let mut report = BatchReport {
        source: paths.source.clone(),
        destination: paths.destination.clone(),
        files: results,
        document: None,
    };

    if let Some(filename) = &config.pdf_filename {
        let outputs = report.output_paths();
        if outputs.is_empty() {
            info!("no processed photos, skipping PDF export");
        } else {
            emit(ProcessEvent::ExportStarted {
                images: outputs.len(),
            });
            let plan = PagePlan::new(PageGeometry::a4_landscape(), config.width_cm, config.height_cm);
            if plan.is_fallback() {
                warn!(
                    "photos {} cm wide do not fit two per page, using one per page",
                    config.width_cm
                );
                emit(ProcessEvent::LayoutFallback {
                    image_width_cm: config.width_cm,
                });
            }
            report.document = Some(export_document(
                &outputs,
                &plan,
                &paths.destination.join(filename),
            ));
        }
    }

    info!(
        "done: {} processed, {} skipped, {} failed",
        report.processed_count(),
        report.skipped_count(),
        report.failed_count()
    );
    Ok(report)
}

/// Run one supported file through every stage and write it to `output`.
fn process_file(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    logo: &RgbaImage,
    config: &ProcessingConfig,
) -> Result<(), (Stage, BackendError)> {
    let name = source.display();

    debug!("{}: {}", name, Stage::Decoding);
    let image = backend.decode(source).map_err(|e| (Stage::Decoding, e))?;

    let orientation = Orientation::from_exif(backend.read_orientation(source));
    debug!("{}: {} ({:?})", name, Stage::CorrectingOrientation, orientation);
    let image = correct_orientation(image, orientation);

    debug!("{}: {}", name, Stage::Resizing);
    let mut canvas = resize_to_canvas(&image, config.target_size(), config.background)
        .map_err(|e| (Stage::Resizing, e))?;
    drop(image);

    let (x, y) = composite_logo(&mut canvas, logo, config.anchor, &config.margins);
    debug!("{}: {} at ({}, {})", name, Stage::CompositingLogo, x, y);

    if let Some(border) = &config.border {
        debug!("{}: {} ({:?}, {} px)", name, Stage::Bordering, border.style, border.thickness);
        canvas = add_border(canvas, border).map_err(|e| (Stage::Bordering, e))?;
    }

    debug!("{}: {} to {}", name, Stage::Encoding, output.display());
    backend
        .save(&canvas, output, config.quality)
        .map_err(|e| (Stage::Encoding, e))?;

    debug!("{}: {}", name, Stage::Done);
    Ok(())
}

fn export_document(outputs: &[PathBuf], plan: &PagePlan, path: &Path) -> DocumentOutcome {
    match layout::export_pdf(outputs, plan, path) {
        Ok(pages) => {
            info!("wrote {} ({} pages)", path.display(), pages);
            DocumentOutcome::Written {
                path: path.to_path_buf(),
                pages,
                images_per_page: plan.images_per_page,
            }
        }
        Err(e) => {
            warn!("PDF export to {} failed: {}", path.display(), e);
            DocumentOutcome::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
