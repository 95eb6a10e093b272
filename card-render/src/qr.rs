//! QR code rasterization
//!
//! Turns arbitrary text into a grayscale raster (black modules on white,
//! with a quiet zone) that can be embedded into a PDF page or encoded as PNG.

use std::io::Cursor;

use base64::Engine;
use image::{GrayImage, ImageFormat};
use qrcode::{Color, EcLevel, QrCode};
use tracing::instrument;

use crate::error::{RenderError, RenderResult};

const DARK: u8 = 0x00;
const LIGHT: u8 = 0xFF;

/// QR rendering options
#[derive(Debug, Clone, Copy)]
pub struct QrOptions {
    /// Minimum edge length of the output image in pixels
    pub min_size: u32,
    /// Quiet zone width in modules
    pub margin: u32,
    pub ec_level: EcLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            min_size: 256,
            margin: 1,
            ec_level: EcLevel::M,
        }
    }
}

/// A rendered QR code (square, 8-bit grayscale)
#[derive(Debug, Clone)]
pub struct QrImage {
    size: u32,
    pixels: Vec<u8>,
}

impl QrImage {
    /// Encode `text` into a QR raster
    #[instrument(skip(text), fields(text_len = text.len()))]
    pub fn encode(text: &str, options: &QrOptions) -> RenderResult<Self> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), options.ec_level)
            .map_err(|e| RenderError::Qr(e.to_string()))?;

        let modules = code.width() as u32;
        let total = modules + 2 * options.margin;
        let scale = options.min_size.div_ceil(total).max(1);
        let size = total * scale;

        let colors = code.to_colors();
        let mut pixels = vec![LIGHT; (size * size) as usize];
        for (index, color) in colors.iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let mx = index as u32 % modules + options.margin;
            let my = index as u32 / modules + options.margin;
            for dy in 0..scale {
                let row = ((my * scale + dy) * size) as usize;
                let start = row + (mx * scale) as usize;
                pixels[start..start + scale as usize].fill(DARK);
            }
        }

        Ok(Self { size, pixels })
    }

    /// Edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row-major 8-bit grayscale pixels
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Encode as PNG bytes
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let image = GrayImage::from_raw(self.size, self.size, self.pixels.clone())
            .ok_or_else(|| RenderError::Image("pixel buffer size mismatch".to_string()))?;
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| RenderError::Image(e.to_string()))?;
        Ok(buf.into_inner())
    }

}

/// Wrap PNG bytes in a data URL
pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}
