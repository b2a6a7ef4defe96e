//! Contact-sheet PDF export.
//!
//! Lays the processed photos out on A4 landscape pages, two side by side
//! when they fit and one centered per page otherwise, and writes the result
//! with `lopdf`. Every photo is drawn at its configured physical size.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ margin ┌────────┐  gap  ┌────────┐       │
//! │        │ photo 1│       │ photo 2│       │
//! │        │        │       │        │       │
//! │        └────────┘       └────────┘       │
//! │                                          │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Placement is pure arithmetic in [`PagePlan`]; only [`export_pdf`] touches
//! the filesystem.

use image::codecs::jpeg::JpegEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// PDF points per centimetre.
pub const POINTS_PER_CM: f64 = 28.35;
/// Distance from the page edge to the first photo, in points.
pub const PAGE_MARGIN_PT: f64 = 28.35;
/// Horizontal space between two photos on the same page, in points.
pub const IMAGE_GAP_PT: f64 = 28.35;

/// Quality used when re-encoding photos for embedding.
const EMBED_QUALITY: u8 = 95;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Failed to embed {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Page size and spacing, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub gap: f64,
}

impl PageGeometry {
    pub const fn a4_landscape() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: PAGE_MARGIN_PT,
            gap: IMAGE_GAP_PT,
        }
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_landscape()
    }
}

/// Where one photo lands: zero-based page, lower-left corner and size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// How a run's photos are distributed over pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlan {
    pub page: PageGeometry,
    pub image_width: f64,
    pub image_height: f64,
    pub images_per_page: usize,
}

impl PagePlan {
    /// Plan pages for photos of the given physical size.
    ///
    /// Two photos share a page when `2·w + gap + 2·margin` fits the page
    /// width; otherwise each gets its own page.
    pub fn new(page: PageGeometry, width_cm: f64, height_cm: f64) -> Self {
        let image_width = width_cm * POINTS_PER_CM;
        let image_height = height_cm * POINTS_PER_CM;
        let needed = 2.0 * image_width + page.gap + 2.0 * page.margin;
        Self {
            page,
            image_width,
            image_height,
            images_per_page: if needed > page.width { 1 } else { 2 },
        }
    }

    /// True when photos are too wide to pair up.
    pub fn is_fallback(&self) -> bool {
        self.images_per_page == 1
    }

    pub fn page_count(&self, images: usize) -> usize {
        images.div_ceil(self.images_per_page)
    }

    /// Placement of each of `images` photos, in input order.
    pub fn placements(&self, images: usize) -> Vec<Placement> {
        let page = &self.page;
        let y = page.height - page.margin - self.image_height;
        (0..images)
            .map(|i| {
                let slot = i % self.images_per_page;
                let x = if self.is_fallback() {
                    (page.width - self.image_width) / 2.0
                } else {
                    page.margin + slot as f64 * (self.image_width + page.gap)
                };
                Placement {
                    page: i / self.images_per_page,
                    x,
                    y,
                    width: self.image_width,
                    height: self.image_height,
                }
            })
            .collect()
    }
}

/// Write `images` to a PDF at `path` following `plan`.
///
/// Returns the number of pages written.
pub fn export_pdf(images: &[PathBuf], plan: &PagePlan, path: &Path) -> Result<usize, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let placements = plan.placements(images.len());

    let mut page_ids: Vec<ObjectId> = Vec::new();
    for (page_index, chunk) in placements.chunks(plan.images_per_page).enumerate() {
        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();

        for (slot, placement) in chunk.iter().enumerate() {
            let source = &images[page_index * plan.images_per_page + slot];
            let image_id = embed_jpeg(&mut doc, source)?;
            let name = format!("Im{}", slot + 1);
            xobjects.set(name.as_bytes().to_vec(), image_id);
            operations.extend(draw_image(&name, placement));
            debug!(
                "page {}: {} at ({:.2}, {:.2})",
                page_index + 1,
                source.display(),
                placement.x,
                placement.y
            );
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
        });
        page_ids.push(page_id);
    }

    let page_count = page_ids.len();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => page_ids.into_iter().map(Object::Reference).collect::<Vec<_>>(),
        "Count" => Object::Integer(page_count as i64),
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(plan.page.width as f32),
            Object::Real(plan.page.height as f32),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path)?;
    Ok(page_count)
}

/// Decode `source`, re-encode it as baseline RGB JPEG and add it as an
/// image XObject.
fn embed_jpeg(doc: &mut Document, source: &Path) -> Result<ObjectId, ExportError> {
    let to_export_error = |e| ExportError::Image {
        path: source.to_path_buf(),
        source: e,
    };
    let rgb = image::open(source).map_err(to_export_error)?.to_rgb8();

    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, EMBED_QUALITY);
    rgb.write_with_encoder(encoder).map_err(to_export_error)?;

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(rgb.width() as i64),
            "Height" => Object::Integer(rgb.height() as i64),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "DCTDecode",
        },
        data,
    );
    Ok(doc.add_object(stream))
}

/// `q w 0 0 h x y cm /Name Do Q`
fn draw_image(name: &str, placement: &Placement) -> [Operation; 4] {
    let real = |v: f64| Object::Real(v as f32);
    [
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(placement.width),
                real(0.0),
                real(0.0),
                real(placement.height),
                real(placement.x),
                real(placement.y),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}
