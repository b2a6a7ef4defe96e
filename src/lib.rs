//! # photo-stamp
//!
//! Batch-prepares a folder of photos for print: every photo is turned
//! upright, fitted onto a canvas of a fixed physical size, stamped with a
//! logo, optionally framed, and written to a destination folder. The results
//! can then be laid out on A4 landscape sheets in a single PDF.
//!
//! # Pipeline
//!
//! ```text
//! source/ ─┬─ a.jpg ──▶ decode ▶ orient ▶ resize ▶ logo ▶ border ▶ encode ──▶ dest/a.jpg
//!          ├─ b.png ──▶ ...                                               ──▶ dest/b.png
//!          └─ notes.txt (skipped)
//!                                                            dest/*.jpg ──▶ dest/photos.pdf
//! ```
//!
//! Files run one at a time in file-name order. A file that fails at any
//! step is recorded in the [`process::BatchReport`] and the batch carries on;
//! only missing paths, an unreadable logo or invalid settings stop a run
//! before it starts.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `photo-stamp.toml` loading, layering with CLI flags, validation, resolution to pixels |
//! | [`imaging`] | Pure-Rust image work: decode/encode backend, orientation, resize, logo, border |
//! | [`process`] | The per-file state machine over a source folder, progress events, batch report |
//! | [`layout`] | A4 page arithmetic and PDF export with `lopdf` |
//! | [`output`] | CLI output formatting for progress, summary and `check` |
//!
//! # Design Decisions
//!
//! ## Physical Sizes, Truncated Pixels
//!
//! Sizes are configured in centimetres at a resolution (300 dpi for print,
//! 72 for the web) and converted with truncation, so 10 × 15 cm at 300 dpi
//! is 1181 × 1771 px. Photos are letterboxed, never cropped, and small
//! photos are scaled up to fill the box.
//!
//! ## Mockable I/O Seam
//!
//! All file access for images goes through the [`imaging::ImageBackend`]
//! trait. The pipeline tests swap in a mock that serves synthetic images and
//! records every call, so pipeline logic is tested without encoding anything.

pub mod config;
pub mod imaging;
pub mod layout;
pub mod output;
pub mod process;

#[cfg(test)]
pub(crate) mod test_helpers;
