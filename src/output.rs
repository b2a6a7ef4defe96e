//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. Diagnostics go through
//! `tracing` instead and never land here.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Processing 3 files from photos
//!     001/003 beach.jpg
//!     002/003 notes.txt: skipped
//!     003/003 pier.jpg
//! Writing PDF with 2 photos
//!
//! Processed 2 of 3 files → stamped
//!     Skipped: 1
//!     PDF: stamped/photos.pdf (1 page, 2 per page)
//! ```
//!
//! ## Check
//!
//! ```text
//! Source: photos
//! Destination: stamped
//! Logo: logo.png (120x40)
//! Output: 1181x1771 px, quality 95, background #ffffff
//!     Logo anchor: bottom-right
//!     Border: none
//!     PDF: photos.pdf
//! Files
//!     001 beach.jpg
//!     002 notes.txt (skipped)
//! 1 to process, 1 skipped
//! ```

use crate::config::ProcessingConfig;
use crate::imaging::is_supported;
use crate::process::{BatchPaths, BatchReport, DocumentOutcome, Outcome, ProcessEvent};
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Run output
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total, source } => {
            vec![format!(
                "Processing {} from {}",
                plural(*total, "file"),
                source.display()
            )]
        }
        ProcessEvent::FileFinished {
            index,
            total,
            file,
            outcome,
        } => {
            let position = format!("{}/{}", format_index(*index), format_index(*total));
            let line = match outcome {
                Outcome::Success => format!("{}{} {}", indent(1), position, file),
                Outcome::Skipped => format!("{}{} {}: skipped", indent(1), position, file),
                Outcome::Failed { stage, .. } => {
                    format!("{}{} {}: failed while {}", indent(1), position, file, stage)
                }
            };
            vec![line]
        }
        ProcessEvent::LayoutFallback { image_width_cm } => {
            vec![format!(
                "Warning: photos {} cm wide do not fit two per page, using one per page",
                image_width_cm
            )]
        }
        ProcessEvent::ExportStarted { images } => {
            vec![format!("Writing PDF with {}", plural(*images, "photo"))]
        }
    }
}

/// Format the end-of-run summary: processed count, destination, document.
pub fn format_summary(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed {} of {} → {}",
        report.processed_count(),
        plural(report.files.len(), "file"),
        report.destination.display()
    )];

    let skipped = report.skipped_count();
    if skipped > 0 {
        lines.push(format!("{}Skipped: {}", indent(1), skipped));
    }

    let failures: Vec<_> = report
        .files
        .iter()
        .filter_map(|f| match &f.outcome {
            Outcome::Failed { stage, reason } => Some((file_name(&f.source), stage, reason)),
            _ => None,
        })
        .collect();
    if !failures.is_empty() {
        lines.push(format!("{}Failed: {}", indent(1), failures.len()));
        for (name, stage, reason) in failures {
            lines.push(format!("{}{} ({}): {}", indent(2), name, stage, reason));
        }
    }

    match &report.document {
        Some(DocumentOutcome::Written {
            path,
            pages,
            images_per_page,
        }) => lines.push(format!(
            "{}PDF: {} ({}, {} per page)",
            indent(1),
            path.display(),
            plural(*pages, "page"),
            images_per_page
        )),
        Some(DocumentOutcome::Failed { path, reason }) => lines.push(format!(
            "{}PDF export to {} failed: {}",
            indent(1),
            path.display(),
            reason
        )),
        None => {}
    }
    lines
}

pub fn print_summary(report: &BatchReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the `check` report: resolved settings and what each file would do.
pub fn format_check(
    paths: &BatchPaths,
    config: &ProcessingConfig,
    logo_size: (u32, u32),
    files: &[PathBuf],
) -> Vec<String> {
    let mut lines = vec![
        format!("Source: {}", paths.source.display()),
        format!("Destination: {}", paths.destination.display()),
        format!(
            "Logo: {} ({}x{})",
            paths.logo.display(),
            logo_size.0,
            logo_size.1
        ),
        format!(
            "Output: {}x{} px, quality {}, background {}",
            config.width_px,
            config.height_px,
            config.quality.value(),
            config.background
        ),
        format!("{}Logo anchor: {}", indent(1), config.anchor),
    ];

    lines.push(match &config.border {
        Some(border) => format!(
            "{}Border: {}, {} px, {}",
            indent(1),
            border.style,
            border.thickness,
            border.color
        ),
        None => format!("{}Border: none", indent(1)),
    });
    lines.push(match &config.pdf_filename {
        Some(name) => format!("{}PDF: {}", indent(1), name),
        None => format!("{}PDF: disabled", indent(1)),
    });

    lines.push("Files".to_string());
    let mut to_process = 0;
    for (i, path) in files.iter().enumerate() {
        let name = file_name(path);
        if is_supported(path) {
            to_process += 1;
            lines.push(format!("{}{} {}", indent(1), format_index(i + 1), name));
        } else {
            lines.push(format!(
                "{}{} {} (skipped)",
                indent(1),
                format_index(i + 1),
                name
            ));
        }
    }
    lines.push(format!(
        "{} to process, {} skipped",
        to_process,
        files.len() - to_process
    ));
    lines
}

pub fn print_check(
    paths: &BatchPaths,
    config: &ProcessingConfig,
    logo_size: (u32, u32),
    files: &[PathBuf],
) {
    for line in format_check(paths, config, logo_size, files) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::imaging::{BorderSpec, BorderStyle, Color};
    use crate::process::{FileResult, Stage};

    fn report(files: Vec<FileResult>, document: Option<DocumentOutcome>) -> BatchReport {
        BatchReport {
            source: "photos".into(),
            destination: "stamped".into(),
            files,
            document,
        }
    }

    fn file(name: &str, outcome: Outcome) -> FileResult {
        let output = matches!(outcome, Outcome::Success).then(|| PathBuf::from("stamped").join(name));
        FileResult {
            source: PathBuf::from("photos").join(name),
            output,
            outcome,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "page"), "1 page");
        assert_eq!(plural(0, "page"), "0 pages");
        assert_eq!(plural(3, "file"), "3 files");
    }

    // =========================================================================
    // Progress events
    // =========================================================================

    #[test]
    fn started_event() {
        let lines = format_process_event(&ProcessEvent::Started {
            total: 3,
            source: "photos".into(),
        });
        assert_eq!(lines, vec!["Processing 3 files from photos"]);
    }

    #[test]
    fn file_events_by_outcome() {
        let event = |outcome| ProcessEvent::FileFinished {
            index: 2,
            total: 12,
            file: "pier.jpg".into(),
            outcome,
        };
        assert_eq!(
            format_process_event(&event(Outcome::Success)),
            vec!["    002/012 pier.jpg"]
        );
        assert_eq!(
            format_process_event(&event(Outcome::Skipped)),
            vec!["    002/012 pier.jpg: skipped"]
        );
        assert_eq!(
            format_process_event(&event(Outcome::Failed {
                stage: Stage::Encoding,
                reason: "disk full".into()
            })),
            vec!["    002/012 pier.jpg: failed while encoding"]
        );
    }

    #[test]
    fn fallback_event_is_a_warning() {
        let lines = format_process_event(&ProcessEvent::LayoutFallback {
            image_width_cm: 40.0,
        });
        assert!(lines[0].starts_with("Warning:"));
        assert!(lines[0].contains("40 cm"));
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_all_processed_with_pdf() {
        let lines = format_summary(&report(
            vec![file("a.jpg", Outcome::Success), file("b.jpg", Outcome::Success)],
            Some(DocumentOutcome::Written {
                path: "stamped/photos.pdf".into(),
                pages: 1,
                images_per_page: 2,
            }),
        ));
        assert_eq!(
            lines,
            vec![
                "Processed 2 of 2 files → stamped",
                "    PDF: stamped/photos.pdf (1 page, 2 per page)",
            ]
        );
    }

    #[test]
    fn summary_lists_skips_and_failures() {
        let lines = format_summary(&report(
            vec![
                file("a.jpg", Outcome::Success),
                file("b.jpg", Outcome::Failed {
                    stage: Stage::Decoding,
                    reason: "truncated".into(),
                }),
                file("c.txt", Outcome::Skipped),
            ],
            None,
        ));
        assert_eq!(
            lines,
            vec![
                "Processed 1 of 3 files → stamped",
                "    Skipped: 1",
                "    Failed: 1",
                "        b.jpg (decoding): truncated",
            ]
        );
    }

    #[test]
    fn summary_reports_pdf_failure() {
        let lines = format_summary(&report(
            vec![file("a.jpg", Outcome::Success)],
            Some(DocumentOutcome::Failed {
                path: "stamped/photos.pdf".into(),
                reason: "permission denied".into(),
            }),
        ));
        assert_eq!(
            lines.last().unwrap(),
            "    PDF export to stamped/photos.pdf failed: permission denied"
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    fn check_paths() -> BatchPaths {
        BatchPaths {
            source: "photos".into(),
            destination: "stamped".into(),
            logo: "logo.png".into(),
        }
    }

    #[test]
    fn check_defaults() {
        let config = ProcessingConfig::from_settings(&Settings::default()).unwrap();
        let files = vec![PathBuf::from("photos/a.jpg"), PathBuf::from("photos/notes.txt")];

        let lines = format_check(&check_paths(), &config, (120, 40), &files);
        assert_eq!(
            lines,
            vec![
                "Source: photos",
                "Destination: stamped",
                "Logo: logo.png (120x40)",
                "Output: 1181x1771 px, quality 95, background #ffffff",
                "    Logo anchor: bottom-right",
                "    Border: none",
                "    PDF: photos.pdf",
                "Files",
                "    001 a.jpg",
                "    002 notes.txt (skipped)",
                "1 to process, 1 skipped",
            ]
        );
    }

    #[test]
    fn check_shows_border_and_disabled_pdf() {
        let mut config = ProcessingConfig::from_settings(&Settings::default()).unwrap();
        config.border = Some(BorderSpec {
            style: BorderStyle::Dashed,
            thickness: 4,
            color: Color::new(0xAA, 0, 0),
            gap_color: Color::WHITE,
        });
        config.pdf_filename = None;

        let lines = format_check(&check_paths(), &config, (1, 1), &[]);
        assert!(lines.contains(&"    Border: dashed, 4 px, #aa0000".to_string()));
        assert!(lines.contains(&"    PDF: disabled".to_string()));
        assert_eq!(lines.last().unwrap(), "0 to process, 0 skipped");
    }
}
