//! # card-render
//!
//! Document rendering library - low-level rendering capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to render:
//! - QR code rasterization (grayscale pixels, PNG, data URL)
//! - Single-page PDF building with the standard Helvetica fonts
//! - WinAnsi encoding for French text
//!
//! Business logic (WHAT to render) should stay in application code:
//! - Membership card layout → member-server
//!
//! ## Example
//!
//! ```no_run
//! use card_render::{PdfPageBuilder, QrImage, QrOptions, Rgb};
//!
//! # fn main() -> card_render::RenderResult<()> {
//! let qr = QrImage::encode("hello", &QrOptions::default())?;
//!
//! let mut page = PdfPageBuilder::a4();
//! page.font_size(24.0)
//!     .fill_color(Rgb::hex(0x00d4ff))
//!     .text_at(50.0, 50.0, "Titre")
//!     .qr_at(350.0, 140.0, 150.0, &qr);
//! let pdf: Vec<u8> = page.build()?;
//! # let _ = pdf;
//! # Ok(())
//! # }
//! ```

mod encoding;
mod error;
mod pdf;
mod qr;

// Re-exports
pub use encoding::to_win_ansi;
pub use error::{RenderError, RenderResult};
pub use pdf::{A4_HEIGHT, A4_WIDTH, PdfPageBuilder, Rgb};
pub use qr::{QrImage, QrOptions, png_data_url};

pub use qrcode::EcLevel;
