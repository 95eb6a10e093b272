//! Single-page PDF builder
//!
//! Provides a fluent API for laying out one page with text, rules and
//! grayscale images at fixed coordinates. Coordinates are in points with
//! the origin at the top-left corner, y growing downwards.

use std::io::Write;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use tracing::instrument;

use crate::encoding::to_win_ansi;
use crate::error::{RenderError, RenderResult};
use crate::qr::QrImage;

/// A4 portrait, in points
pub const A4_WIDTH: f32 = 595.0;
pub const A4_HEIGHT: f32 = 842.0;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// RGB color with 0.0..=1.0 components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0.0, 0.0, 0.0);

    /// From a `0xRRGGBB` literal
    pub fn hex(value: u32) -> Self {
        let channel = |shift: u32| ((value >> shift) & 0xFF) as f32 / 255.0;
        Self(channel(16), channel(8), channel(0))
    }
}

struct EmbeddedImage {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

/// Single-page PDF builder
pub struct PdfPageBuilder {
    width: f32,
    height: f32,
    ops: Vec<Operation>,
    images: Vec<EmbeddedImage>,
    font: &'static str,
    font_size: f32,
    fill: Rgb,
    stroke: Rgb,
    line_width: f32,
    title: Option<String>,
}

impl PdfPageBuilder {
    /// Create a builder for a page of the given size in points
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ops: Vec::with_capacity(64),
            images: Vec::new(),
            font: FONT_REGULAR,
            font_size: 12.0,
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            line_width: 1.0,
            title: None,
        }
    }

    /// A4 portrait page
    pub fn a4() -> Self {
        Self::new(A4_WIDTH, A4_HEIGHT)
    }

    /// Document title (PDF metadata)
    pub fn title(&mut self, title: &str) -> &mut Self {
        self.title = Some(title.to_string());
        self
    }

    // === Text Style ===

    pub fn font_size(&mut self, size: f32) -> &mut Self {
        self.font_size = size;
        self
    }

    pub fn bold(&mut self) -> &mut Self {
        self.font = FONT_BOLD;
        self
    }

    pub fn regular(&mut self) -> &mut Self {
        self.font = FONT_REGULAR;
        self
    }

    pub fn fill_color(&mut self, color: Rgb) -> &mut Self {
        self.fill = color;
        self
    }

    // === Stroke Style ===

    pub fn stroke_color(&mut self, color: Rgb) -> &mut Self {
        self.stroke = color;
        self
    }

    pub fn line_width(&mut self, width: f32) -> &mut Self {
        self.line_width = width;
        self
    }

    // === Drawing ===

    /// Draw text with its top edge at (`x`, `y`)
    pub fn text_at(&mut self, x: f32, y: f32, text: &str) -> &mut Self {
        // Baseline sits roughly 0.8 em below the top of the line box.
        let baseline = self.height - y - self.font_size * 0.8;
        let Rgb(r, g, b) = self.fill;
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![self.font.into(), self.font_size.into()]),
            Operation::new("rg", vec![r.into(), g.into(), b.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![Object::string_literal(to_win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Draw a straight line from (`x1`, `y1`) to (`x2`, `y2`)
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        let Rgb(r, g, b) = self.stroke;
        self.ops.extend([
            Operation::new("RG", vec![r.into(), g.into(), b.into()]),
            Operation::new("w", vec![self.line_width.into()]),
            Operation::new("m", vec![x1.into(), (self.height - y1).into()]),
            Operation::new("l", vec![x2.into(), (self.height - y2).into()]),
            Operation::new("S", vec![]),
        ]);
        self
    }

    /// Horizontal rule at `y` spanning `x1..x2`
    pub fn rule(&mut self, x1: f32, x2: f32, y: f32) -> &mut Self {
        self.line(x1, y, x2, y)
    }

    /// Draw a QR raster with its top-left corner at (`x`, `y`), scaled to `size` points
    pub fn qr_at(&mut self, x: f32, y: f32, size: f32, qr: &QrImage) -> &mut Self {
        let name = format!("Im{}", self.images.len());
        self.images.push(EmbeddedImage {
            name: name.clone(),
            width: qr.size(),
            height: qr.size(),
            pixels: qr.pixels().to_vec(),
        });
        let bottom = self.height - y - size;
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    size.into(),
                    0.into(),
                    0.into(),
                    size.into(),
                    x.into(),
                    bottom.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ]);
        self
    }

    // === Build ===

    /// Assemble the document and serialize it into memory
    #[instrument(skip(self), fields(ops = self.ops.len(), images = self.images.len()))]
    pub fn build(self) -> RenderResult<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let font_bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut xobjects = lopdf::Dictionary::new();
        for image in self.images {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(image.width),
                    "Height" => i64::from(image.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                image.pixels,
            ));
            xobjects.set(image.name.into_bytes(), image_id);
        }

        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => font_regular,
                FONT_BOLD => font_bold,
            },
            "XObject" => xobjects,
        });

        let content = Content {
            operations: self.ops,
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), self.width.into(), self.height.into()],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = self.title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(to_win_ansi(&title)),
                "Producer" => Object::string_literal("card-render"),
            });
            doc.trailer.set("Info", info_id);
        }

        doc.compress();

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(buf)
    }

    /// Build and write to `path`
    ///
    /// Output goes to a temporary file in the same directory and is renamed
    /// into place, so `path` either holds a complete document or is untouched.
    pub fn write_to_path(self, path: &Path) -> RenderResult<()> {
        let bytes = self.build()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| RenderError::Io(e.error))?;
        Ok(())
    }
}
