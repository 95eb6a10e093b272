//! Member QR code
//!
//! The payload is captured once at issue time and frozen into the record;
//! the image is a deterministic function of it.

use card_render::{QrImage, QrOptions, RenderError};
use shared::models::QrPayload;

/// A member's QR payload with its rendered image
#[derive(Debug, Clone)]
pub struct MemberQr {
    pub payload: QrPayload,
    pub image: QrImage,
    pub png: Vec<u8>,
    /// `data:image/png;base64,...`
    pub data_url: String,
}

/// Builds and renders member QR payloads
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    options: QrOptions,
}

impl QrEncoder {
    /// Encode `{type, memberId, timestamp, version}` for `member_id`
    pub fn encode(&self, member_id: &str, timestamp_ms: i64) -> Result<MemberQr, RenderError> {
        let payload = QrPayload::new(member_id, timestamp_ms);
        let text = payload
            .to_json()
            .map_err(|e| RenderError::Qr(e.to_string()))?;
        let image = QrImage::encode(&text, &self.options)?;
        let png = image.to_png()?;
        let data_url = card_render::png_data_url(&png);
        Ok(MemberQr {
            payload,
            image,
            png,
            data_url,
        })
    }
}
