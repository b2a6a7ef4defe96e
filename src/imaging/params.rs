//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are shared by
//! the [`operations`](super::operations) module (which does the pixel work)
//! and the run configuration (which resolves them from `photo-stamp.toml`).
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 95). Clamped on construction.
//! - [`Orientation`] — Rotation implied by an EXIF orientation code.
//! - [`Anchor`] — Where the logo is placed on the canvas.
//! - [`Margins`] — Logo margins plus the signed vertical offset.
//! - [`BorderStyle`] / [`BorderSpec`] — Border decoration after compositing.

use super::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Rotation needed to display a photo upright.
///
/// Only the pure rotations are honoured. Mirrored EXIF codes (2, 4, 5, 7)
/// are treated like a missing tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    /// EXIF 3.
    Rotate180,
    /// EXIF 6: the camera was turned clockwise, rotate 90° clockwise to fix.
    Rotate90Cw,
    /// EXIF 8: rotate 270° clockwise (90° counter-clockwise).
    Rotate270Cw,
}

impl Orientation {
    pub fn from_exif(code: Option<u32>) -> Self {
        match code {
            Some(3) => Orientation::Rotate180,
            Some(6) => Orientation::Rotate90Cw,
            Some(8) => Orientation::Rotate270Cw,
            _ => Orientation::Normal,
        }
    }
}

/// Logo placement reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
    Center,
}

impl Anchor {
    pub const ALL: [Anchor; 5] = [
        Anchor::BottomRight,
        Anchor::BottomLeft,
        Anchor::TopRight,
        Anchor::TopLeft,
        Anchor::Center,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::BottomRight => "bottom-right",
            Anchor::BottomLeft => "bottom-left",
            Anchor::TopRight => "top-right",
            Anchor::TopLeft => "top-left",
            Anchor::Center => "center",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Anchor::ALL.iter().map(|a| a.name()).collect();
                format!("unknown anchor '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Logo margins in pixels. Only the margins facing the anchor are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
    /// Added to the y coordinate for every anchor; negative moves the logo up.
    pub vertical_offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
}

impl BorderStyle {
    pub fn name(self) -> &'static str {
        match self {
            BorderStyle::Solid => "solid",
            BorderStyle::Dashed => "dashed",
        }
    }
}

impl fmt::Display for BorderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BorderStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "solid" => Ok(BorderStyle::Solid),
            "dashed" => Ok(BorderStyle::Dashed),
            _ => Err(format!("unknown border style '{s}', expected solid or dashed")),
        }
    }
}

/// A resolved border: style, band thickness and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSpec {
    pub style: BorderStyle,
    /// Band width in pixels. Zero or negative disables the border.
    pub thickness: i32,
    pub color: Color,
    /// Paint used for the gaps of a dashed border.
    pub gap_color: Color,
}
