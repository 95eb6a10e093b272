//! Welcome email content
//!
//! Pure functions of the member record. Every member-supplied value is
//! HTML-escaped.

use std::fmt::Write;

use shared::branding;
use shared::models::MemberRecord;
use shared::util::format_date_fr;

pub const WELCOME_SUBJECT: &str = "🎉 Bienvenue dans l'équipe 4nap ! Votre pass fidélité";

/// A wallet-pass button in the email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletLink {
    pub label: String,
    pub url: String,
}

/// Wallet links for `member_id` under `base_url`
pub fn wallet_links(base_url: &str, member_id: &str) -> Vec<WalletLink> {
    let base = base_url.trim_end_matches('/');
    vec![
        WalletLink {
            label: "Ajouter à Google Wallet".into(),
            url: format!("{base}/wallet/google/{member_id}"),
        },
        WalletLink {
            label: "Ajouter à Apple Wallet".into(),
            url: format!("{base}/wallet/apple/{member_id}"),
        },
    ]
}

/// Characters kept from each name in [`card_filename`]
const FILENAME_PART_MAX_CHARS: usize = 40;

/// `4nap-pass-fidelite-<prenom>-<nom>.pdf`, restricted to filename-safe
/// characters, each name cut to [`FILENAME_PART_MAX_CHARS`]
pub fn card_filename(record: &MemberRecord) -> String {
    fn clean(part: &str) -> String {
        part.split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
            .take(FILENAME_PART_MAX_CHARS)
            .collect()
    }
    format!(
        "{}-pass-fidelite-{}-{}.pdf",
        branding::ORG_SHORT_NAME,
        clean(&record.registration.prenom),
        clean(&record.registration.nom)
    )
}

/// Escape text for HTML element and attribute content
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; background-color: #f4f4f4; }
    .email-container { max-width: 600px; margin: 0 auto; background-color: #ffffff; border-radius: 10px; overflow: hidden; }
    .header { background: linear-gradient(135deg, #1a1a2e, #16213e); color: white; padding: 30px; text-align: center; }
    .header h1 { margin: 0; font-size: 2.5em; background: linear-gradient(135deg, #00d4ff, #9933ff); -webkit-background-clip: text; -webkit-text-fill-color: transparent; }
    .content { padding: 30px; }
    .welcome-message { text-align: center; margin-bottom: 30px; }
    .member-info { background-color: #f8f9fa; padding: 20px; border-radius: 10px; margin: 20px 0; }
    .info-row { display: flex; justify-content: space-between; margin: 10px 0; padding: 5px 0; border-bottom: 1px solid #eee; }
    .info-label { font-weight: bold; color: #666; }
    .qr-info { background: linear-gradient(135deg, #00d4ff, #9933ff); color: white; padding: 20px; border-radius: 10px; text-align: center; margin: 20px 0; }
    .features { margin: 30px 0; }
    .feature-item { display: flex; align-items: center; margin: 15px 0; }
    .feature-icon { font-size: 24px; margin-right: 15px; }
    .wallet { text-align: center; margin: 20px 0; }
    .wallet a { display: inline-block; margin: 5px; padding: 12px 20px; background: #000; color: #fff; border-radius: 8px; text-decoration: none; }
    .cta { background-color: #f8f9fa; padding: 20px; border-radius: 15px; text-align: center; margin: 20px 0; }
    .footer { background-color: #1a1a2e; color: white; padding: 20px; text-align: center; }
"#;

const FEATURES: [(&str, &str, &str); 4] = [
    ("🎫", "Accès privilégié", "Entrée prioritaire au Fort Napoléon"),
    ("🎁", "Programme fidélité", "Réductions et avantages exclusifs"),
    ("📅", "Événements exclusifs", "Invitation aux événements membres"),
    ("💬", "Support prioritaire", "Assistance dédiée aux membres"),
];

/// Welcome email body
pub fn membership_email_html(record: &MemberRecord, wallet: &[WalletLink]) -> String {
    let reg = &record.registration;
    let rows = [
        ("Nom complet", escape_html(&record.full_name())),
        ("Email", escape_html(&reg.email)),
        ("Type de membre", escape_html(&reg.type_membre)),
        ("Date d'inscription", format_date_fr(record.date_inscription)),
        ("Valide jusqu'au", format_date_fr(record.date_fin_abonnement)),
        ("ID Membre", escape_html(&record.id)),
    ];

    let mut html = String::with_capacity(8 * 1024);
    // Writing into a String cannot fail.
    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Bienvenue chez {short}</title>
<style>{STYLE}</style>
</head>
<body>
<div class="email-container">
<div class="header">
<h1>{short}</h1>
<p>Fort Napoléon - La Seyne</p>
</div>
<div class="content">
<div class="welcome-message">
<h2>🎉 Bienvenue {prenom} !</h2>
<p>Félicitations ! Vous êtes maintenant membre de la communauté {short}.</p>
</div>
<div class="member-info">
<h3>📋 Vos informations de membre</h3>
"#,
        short = branding::ORG_SHORT_NAME,
        prenom = escape_html(&reg.prenom),
    );

    for (label, value) in &rows {
        let _ = writeln!(
            html,
            "<div class=\"info-row\"><span class=\"info-label\">{label}:</span><span>{value}</span></div>"
        );
    }

    html.push_str(
        r#"</div>
<div class="qr-info">
<h3>📱 Votre Pass QR Code</h3>
<p>Votre pass fidélité QR code unique est joint à cet email en PDF. Conservez-le précieusement et présentez-le lors de vos visites au Fort Napoléon.</p>
</div>
"#,
    );

    if !wallet.is_empty() {
        html.push_str("<div class=\"wallet\">\n<h3>📲 Ajoutez votre pass à votre téléphone</h3>\n");
        for link in wallet {
            let _ = writeln!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&link.url),
                escape_html(&link.label)
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("<div class=\"features\">\n<h3>✨ Vos avantages membre</h3>\n");
    for (icon, title, text) in FEATURES {
        let _ = writeln!(
            html,
            "<div class=\"feature-item\"><div class=\"feature-icon\">{icon}</div><div><strong>{title}</strong><br>{text}</div></div>"
        );
    }

    let _ = write!(
        html,
        r#"</div>
<div class="cta">
<h3>🚀 Prêt à vivre l'expérience {short} ?</h3>
<p>Votre aventure au Fort Napoléon commence maintenant. Nous avons hâte de vous accueillir !</p>
</div>
</div>
<div class="footer">
<p><strong>{org}</strong></p>
<p>{location}</p>
<p>{website} | {contact}</p>
<p style="font-size: 12px; margin-top: 20px;">Cet email a été envoyé automatiquement. Si vous avez des questions, contactez-nous.</p>
</div>
</div>
</body>
</html>
"#,
        short = branding::ORG_SHORT_NAME,
        org = branding::ORG_NAME,
        location = branding::ORG_LOCATION,
        website = branding::ORG_WEBSITE,
        contact = branding::ORG_CONTACT_EMAIL,
    );

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::record;

    #[test]
    fn body_embeds_member_details() {
        let html = membership_email_html(&record("abc-123"), &[]);
        assert!(html.contains("Bienvenue Jean !"));
        assert!(html.contains("<span>Jean Dupont</span>"));
        assert!(html.contains("<span>jean@test.fr</span>"));
        assert!(html.contains("<span>annuel</span>"));
        assert!(html.contains("<span>01/03/2024</span>"));
        assert!(html.contains("<span>01/03/2025</span>"));
        assert!(html.contains("<span>abc-123</span>"));
        assert!(!html.contains("class=\"wallet\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let rec = record("abc");
        assert_eq!(
            membership_email_html(&rec, &[]),
            membership_email_html(&rec, &[])
        );
    }

    #[test]
    fn member_values_are_escaped() {
        let mut rec = record("abc");
        rec.registration.prenom = "<script>alert('x')</script>".into();
        let html = membership_email_html(&rec, &[]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn wallet_links_are_appended_when_present() {
        let links = wallet_links("https://api.4nap.fr/", "abc");
        assert_eq!(links[0].url, "https://api.4nap.fr/wallet/google/abc");
        assert_eq!(links[1].url, "https://api.4nap.fr/wallet/apple/abc");

        let html = membership_email_html(&record("abc"), &links);
        assert!(html.contains("href=\"https://api.4nap.fr/wallet/google/abc\""));
        assert!(html.contains("Ajouter à Apple Wallet"));
    }

    #[test]
    fn filename_is_sanitized() {
        let mut rec = record("abc");
        assert_eq!(card_filename(&rec), "4nap-pass-fidelite-Jean-Dupont.pdf");

        rec.registration.prenom = "Marie Hélène".into();
        rec.registration.nom = "d'Arc/../x".into();
        assert_eq!(
            card_filename(&rec),
            "4nap-pass-fidelite-Marie-Hélène-dArcx.pdf"
        );
    }

    #[test]
    fn filename_parts_are_capped() {
        let mut rec = record("abc");
        rec.registration.prenom = "Jean".into();
        rec.registration.nom = "é".repeat(130);
        let name = card_filename(&rec);
        assert_eq!(
            name,
            format!("4nap-pass-fidelite-Jean-{}.pdf", "é".repeat(FILENAME_PART_MAX_CHARS))
        );
        assert!(name.len() < 255);
    }
}
