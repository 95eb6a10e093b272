//! Member Model
//!
//! Wire names follow the registration form (`prenom`, `codePostal`, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registration payload submitted by the public form (untrusted)
///
/// Every field defaults to empty so that a partially filled form still
/// deserializes and the validator can report all missing fields at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemberRegistration {
    pub prenom: String,
    pub nom: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    pub adresse: String,
    pub code_postal: String,
    pub ville: String,
    pub pays: String,
    pub type_membre: String,
    pub conditions: bool,
}

impl MemberRegistration {
    /// Copy with every text field trimmed and an empty phone dropped
    pub fn normalized(&self) -> Self {
        Self {
            prenom: self.prenom.trim().to_string(),
            nom: self.nom.trim().to_string(),
            email: self.email.trim().to_string(),
            telephone: self
                .telephone
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            adresse: self.adresse.trim().to_string(),
            code_postal: self.code_postal.trim().to_string(),
            ville: self.ville.trim().to_string(),
            pays: self.pays.trim().to_string(),
            type_membre: self.type_membre.trim().to_string(),
            conditions: self.conditions,
        }
    }
}

/// Membership status
///
/// Only `Active` is ever assigned; the other states exist for records
/// managed outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberStatus {
    #[default]
    #[serde(rename = "actif")]
    Active,
    #[serde(rename = "expire")]
    Expired,
    #[serde(rename = "renouvele")]
    Renewed,
}

/// Structured content encoded into the member QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub member_id: String,
    /// Issue time, milliseconds since the Unix epoch
    pub timestamp: i64,
    pub version: String,
}

impl QrPayload {
    pub const KIND: &'static str = "4nap-member";
    pub const VERSION: &'static str = "1.0";

    pub fn new(member_id: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            member_id: member_id.into(),
            timestamp,
            version: Self::VERSION.to_string(),
        }
    }

    /// Compact JSON, the exact text embedded in the QR code
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Member record (server-owned, canonical)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: String,
    #[serde(flatten)]
    pub registration: MemberRegistration,
    pub date_inscription: DateTime<Utc>,
    pub date_debut_abonnement: DateTime<Utc>,
    pub date_fin_abonnement: DateTime<Utc>,
    pub statut: MemberStatus,
    pub qr_payload: QrPayload,
    /// `data:image/png;base64,...`
    pub qr_code_data: String,
    pub email_envoye: bool,
}

impl MemberRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.registration.prenom, self.registration.nom)
    }
}
