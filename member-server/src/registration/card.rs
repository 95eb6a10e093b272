//! Membership card layout
//!
//! One A4 page, fixed coordinates (points, top-left origin).

use std::path::Path;

use card_render::{PdfPageBuilder, QrImage, RenderResult, Rgb};
use shared::branding;
use shared::models::MemberRecord;
use shared::util::format_date_fr;

const MARGIN_X: f32 = 50.0;
const ACCENT: u32 = 0x00d4ff;
const MUTED: u32 = 0x666666;
const FAINT: u32 = 0x999999;

const INFO_TOP: f32 = 170.0;
const INFO_STEP: f32 = 25.0;
const QR_X: f32 = 350.0;
const QR_Y: f32 = 140.0;
const QR_SIZE: f32 = 150.0;

const INSTRUCTIONS: [&str; 3] = [
    "• Présentez ce QR code lors de votre visite au Fort Napoléon",
    "• Ce pass est personnel et non transférable",
    "• Conservez ce document précieusement",
];

/// Attribute lines in card order
pub fn member_info_lines(record: &MemberRecord) -> Vec<String> {
    let reg = &record.registration;
    vec![
        format!("Nom: {}", reg.nom),
        format!("Prénom: {}", reg.prenom),
        format!("Email: {}", reg.email),
        format!("Type: {}", reg.type_membre),
        format!(
            "Date d'inscription: {}",
            format_date_fr(record.date_inscription)
        ),
        format!(
            "Valide jusqu'au: {}",
            format_date_fr(record.date_fin_abonnement)
        ),
        format!("ID Membre: {}", record.id),
    ]
}

fn layout(record: &MemberRecord, qr: &QrImage) -> PdfPageBuilder {
    let mut page = PdfPageBuilder::a4();
    page.title(&format!(
        "{} - {}",
        branding::CARD_TITLE,
        record.full_name()
    ));

    // Header
    page.bold()
        .font_size(24.0)
        .fill_color(Rgb::hex(ACCENT))
        .text_at(MARGIN_X, 50.0, branding::ORG_NAME)
        .regular()
        .font_size(16.0)
        .fill_color(Rgb::hex(MUTED))
        .text_at(MARGIN_X, 80.0, branding::CARD_TITLE)
        .stroke_color(Rgb::hex(ACCENT))
        .line_width(2.0)
        .rule(MARGIN_X, 550.0, 110.0);

    // Member block
    page.bold()
        .font_size(14.0)
        .fill_color(Rgb::BLACK)
        .text_at(MARGIN_X, 140.0, "Informations du Membre")
        .regular()
        .font_size(12.0);
    for (i, line) in member_info_lines(record).iter().enumerate() {
        page.text_at(MARGIN_X, INFO_TOP + INFO_STEP * i as f32, line);
    }

    page.qr_at(QR_X, QR_Y, QR_SIZE, qr);

    // Instructions
    page.font_size(12.0)
        .fill_color(Rgb::hex(MUTED))
        .bold()
        .text_at(MARGIN_X, 400.0, "Instructions:")
        .regular();
    for (i, line) in INSTRUCTIONS.iter().enumerate() {
        page.text_at(MARGIN_X, 420.0 + 20.0 * i as f32, line);
    }

    // Footer
    page.font_size(10.0)
        .fill_color(Rgb::hex(FAINT))
        .text_at(
            MARGIN_X,
            700.0,
            &format!("{}, {}", branding::ORG_NAME, branding::ORG_LOCATION),
        )
        .text_at(
            MARGIN_X,
            715.0,
            &format!("{} | {}", branding::ORG_WEBSITE, branding::ORG_CONTACT_EMAIL),
        );

    page
}

/// Render the card into memory
pub fn render_card_bytes(record: &MemberRecord, qr: &QrImage) -> RenderResult<Vec<u8>> {
    layout(record, qr).build()
}

/// Render the card to `path` (complete file or nothing)
pub fn render_card_to_path(record: &MemberRecord, qr: &QrImage, path: &Path) -> RenderResult<()> {
    layout(record, qr).write_to_path(path)
}
