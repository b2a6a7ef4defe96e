//! Run configuration.
//!
//! Handles loading, validating, and layering `photo-stamp.toml`. Settings
//! are resolved in three layers: stock defaults, then the config file, then
//! command-line flags. Every layer is a sparse TOML table merged over the
//! previous one, so a file (or a flag) only has to name what it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! # source = "photos"          # Folder of input photos
//! # destination = "stamped"    # Output folder (created if absent)
//! # logo = "logo.png"          # Logo composited onto every photo
//!
//! [size]
//! width_cm = 10.0
//! height_cm = 15.0
//! dpi = 300                   # 300 for print, 72 for web
//! background = "#ffffff"      # Letterbox fill
//! quality = 95                # JPEG quality (1-100)
//!
//! [logo]
//! anchor = "bottom-right"     # bottom-right, bottom-left, top-right, top-left, center
//! margin_left = 20
//! margin_right = 20
//! margin_top = 20
//! margin_bottom = 20
//! vertical_offset = 0         # Negative moves the logo up
//!
//! [border]
//! enabled = false
//! style = "solid"             # solid or dashed
//! thickness = 5
//! color = "#000000"
//! gap_color = "#ffffff"       # Paint between dashes
//!
//! [pdf]
//! enabled = true
//! filename = "photos.pdf"
//! ```
//!
//! Unknown keys are rejected to catch typos early.
//!
//! The deserialized [`Settings`] keep colors as strings and sizes in
//! centimetres. [`ProcessingConfig::from_settings`] turns them into the
//! immutable per-run values the pipeline consumes.

use crate::imaging::{
    Anchor, BorderSpec, BorderStyle, Color, ColorError, Margins, Quality,
    calculate_framed_dimensions, canvas_within_limits, length_to_pixels,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "photo-stamp.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid color for {field}: {source}")]
    InvalidColor {
        field: &'static str,
        #[source]
        source: ColorError,
    },
    #[error(
        "Invalid target size {width}x{height} px: each side must be 1-65535 px and the area at most 250 megapixels"
    )]
    InvalidTargetSize { width: u32, height: u32 },
}

/// Settings loaded from `photo-stamp.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub paths: PathsConfig,
    pub size: SizeConfig,
    pub logo: LogoConfig,
    pub border: BorderConfig,
    pub pdf: PdfConfig,
}

/// Input and output locations. Each may also come from the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<PathBuf>,
}

/// Physical output size and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeConfig {
    pub width_cm: f64,
    pub height_cm: f64,
    pub dpi: u32,
    /// Letterbox fill color, `#rrggbb`.
    pub background: String,
    /// JPEG quality, 1-100. Lossless formats ignore it.
    pub quality: u32,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self {
            width_cm: 10.0,
            height_cm: 15.0,
            dpi: 300,
            background: "#ffffff".to_string(),
            quality: 95,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogoConfig {
    pub anchor: Anchor,
    pub margin_left: u32,
    pub margin_right: u32,
    pub margin_top: u32,
    pub margin_bottom: u32,
    pub vertical_offset: i32,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            anchor: Anchor::BottomRight,
            margin_left: 20,
            margin_right: 20,
            margin_top: 20,
            margin_bottom: 20,
            vertical_offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderConfig {
    pub enabled: bool,
    pub style: BorderStyle,
    /// Band width in pixels.
    pub thickness: i32,
    pub color: String,
    pub gap_color: String,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            style: BorderStyle::Solid,
            thickness: 5,
            color: "#000000".to_string(),
            gap_color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
    pub enabled: bool,
    /// Written inside the destination folder; `.pdf` is appended if missing.
    pub filename: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filename: "photos.pdf".to_string(),
        }
    }
}

impl Settings {
    /// Validate config values are within acceptable ranges.
    ///
    /// Colors and the pixel size are checked later, by
    /// [`ProcessingConfig::from_settings`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = &self.size;
        for (name, value) in [("size.width_cm", size.width_cm), ("size.height_cm", size.height_cm)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if size.dpi == 0 {
            return Err(ConfigError::Validation("size.dpi must be at least 1".into()));
        }
        if size.quality == 0 || size.quality > 100 {
            return Err(ConfigError::Validation(
                "size.quality must be 1-100".into(),
            ));
        }
        if self.pdf.enabled {
            let name = self.pdf.filename.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "pdf.filename must not be empty when pdf export is enabled".into(),
                ));
            }
            if !is_plain_file_name(name) {
                return Err(ConfigError::Validation(format!(
                    "pdf.filename must be a file name without directories, got {name:?}"
                )));
            }
        }
        Ok(())
    }
}

/// A single normal path component, so joining it stays inside the parent.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Stock defaults as a TOML table, the bottom layer of every merge.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(Settings::default())
        .map_err(|e| ConfigError::Validation(format!("default settings do not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist and `required` is false.
pub fn load_raw_config(path: &Path, required: bool) -> Result<Option<toml::Value>, ConfigError> {
    if !required && !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge each overlay in order onto the stock defaults, then deserialize
/// and validate.
pub fn resolve_settings(
    overlays: impl IntoIterator<Item = toml::Value>,
) -> Result<Settings, ConfigError> {
    let merged = overlays
        .into_iter()
        .fold(stock_defaults_value()?, merge_toml);
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings from a config file layered over the stock defaults.
///
/// A missing file yields the defaults unless `required` is set, in which
/// case it is an IO error.
pub fn load_config(path: &Path, required: bool) -> Result<Settings, ConfigError> {
    resolve_settings(load_raw_config(path, required)?)
}

/// Document file name with `.pdf` appended unless it already ends that way
/// (in any case).
pub fn with_pdf_extension(name: &str) -> String {
    let name = name.trim();
    if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}

/// Resolved, immutable configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingConfig {
    pub width_px: u32,
    pub height_px: u32,
    /// Physical size in centimetres, used to size images on PDF pages.
    pub width_cm: f64,
    pub height_cm: f64,
    pub background: Color,
    pub quality: Quality,
    pub anchor: Anchor,
    pub margins: Margins,
    /// `None` when the border is disabled.
    pub border: Option<BorderSpec>,
    /// Document file name, `None` when pagination is disabled.
    pub pdf_filename: Option<String>,
}

impl ProcessingConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let size = &settings.size;

        let width_px = length_to_pixels(size.width_cm, size.dpi);
        let height_px = length_to_pixels(size.height_cm, size.dpi);
        if width_px == 0
            || height_px == 0
            || !canvas_within_limits(width_px as u64, height_px as u64)
        {
            return Err(ConfigError::InvalidTargetSize {
                width: width_px,
                height: height_px,
            });
        }

        let border = if settings.border.enabled {
            let thickness = settings.border.thickness;
            if calculate_framed_dimensions((width_px, height_px), thickness).is_none() {
                return Err(ConfigError::Validation(format!(
                    "border.thickness {thickness} makes a {width_px}x{height_px} px photo too large to frame"
                )));
            }
            Some(BorderSpec {
                style: settings.border.style,
                thickness: settings.border.thickness,
                color: color_field("border.color", &settings.border.color)?,
                gap_color: color_field("border.gap_color", &settings.border.gap_color)?,
            })
        } else {
            None
        };

        let logo = &settings.logo;
        Ok(Self {
            width_px,
            height_px,
            width_cm: size.width_cm,
            height_cm: size.height_cm,
            background: color_field("size.background", &size.background)?,
            quality: Quality::new(size.quality),
            anchor: logo.anchor,
            margins: Margins {
                left: logo.margin_left,
                right: logo.margin_right,
                top: logo.margin_top,
                bottom: logo.margin_bottom,
                vertical_offset: logo.vertical_offset,
            },
            border,
            pdf_filename: settings
                .pdf
                .enabled
                .then(|| with_pdf_extension(&settings.pdf.filename)),
        })
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

fn color_field(field: &'static str, text: &str) -> Result<Color, ConfigError> {
    Color::parse(text).map_err(|source| ConfigError::InvalidColor { field, source })
}

/// Returns a fully-commented stock `photo-stamp.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# photo-stamp configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Locations (may also be given with --source, --dest and --logo)
# ---------------------------------------------------------------------------
[paths]
# source = "photos"
# destination = "stamped"
# logo = "logo.png"

# ---------------------------------------------------------------------------
# Output size
# ---------------------------------------------------------------------------
[size]
# Physical size of every output photo.
width_cm = 10.0
height_cm = 15.0

# Resolution used to turn centimetres into pixels.
# 300 suits print, 72 suits the web.
dpi = 300

# Fill color around photos whose aspect ratio differs from the target.
background = "#ffffff"

# JPEG encoding quality (1 = worst, 100 = best). PNG and BMP are lossless.
quality = 95

# ---------------------------------------------------------------------------
# Logo placement (pixels)
# ---------------------------------------------------------------------------
[logo]
# One of: bottom-right, bottom-left, top-right, top-left, center
anchor = "bottom-right"

# Only the margins facing the anchor are used.
margin_left = 20
margin_right = 20
margin_top = 20
margin_bottom = 20

# Added to the vertical position for every anchor. Negative moves up.
vertical_offset = 0

# ---------------------------------------------------------------------------
# Border
# ---------------------------------------------------------------------------
[border]
enabled = false

# solid or dashed (5 px dash, 5 px gap)
style = "solid"

# Band width in pixels, added on every side.
thickness = 5

color = "#000000"

# Paint between the dashes of a dashed border.
gap_color = "#ffffff"

# ---------------------------------------------------------------------------
# PDF contact sheet (A4 landscape, two photos per page when they fit)
# ---------------------------------------------------------------------------
[pdf]
enabled = true

# Written inside the destination folder. ".pdf" is appended if missing.
filename = "photos.pdf"
"##
}
