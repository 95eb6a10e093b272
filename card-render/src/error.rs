//! Error types for the rendering library

use thiserror::Error;

/// Rendering error types
///
/// A render either produces complete output or fails with one of these;
/// partial output is never returned.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Data does not fit in a QR code
    #[error("QR encoding failed: {0}")]
    Qr(String),

    /// Raster encoding (PNG) failed
    #[error("Image encoding failed: {0}")]
    Image(String),

    /// PDF object or stream serialization failed
    #[error("PDF generation failed: {0}")]
    Pdf(String),

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
