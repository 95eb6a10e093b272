//! Membership registration pipeline
//!
//! validate → allocate id → QR payload → card PDF → persist → email.
//!
//! Everything before persistence is a hard failure and leaves no record.
//! Once the record is stored the registration has succeeded; email delivery
//! is reported separately in [`RegistrationOutcome::delivery`].

pub mod card;
pub mod identity;
pub mod qr;
pub mod validation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use card_render::RenderError;
use chrono::Utc;
use shared::models::{MemberRecord, MemberRegistration, MemberStatus};
use shared::util::one_year_after;
use thiserror::Error;
use tracing::instrument;

use crate::notify::template::{self, WalletLink};
use crate::notify::{MailAttachment, Notifier, OutgoingMail};
use crate::store::{MemberStore, StoreError};

pub use qr::{MemberQr, QrEncoder};
pub use validation::FieldError;

/// Why a registration was not recorded
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("registration rejected: {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("rendering failed for member {member_id}: {source}")]
    Render {
        member_id: String,
        #[source]
        source: RenderError,
    },

    #[error("persistence failed for member {member_id}: {source}")]
    Persistence {
        member_id: String,
        #[source]
        source: StoreError,
    },
}

/// Outcome of the email phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

/// A recorded registration
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub record: MemberRecord,
    pub delivery: Delivery,
}

/// Drives one registration from form input to stored record and email
#[derive(Clone)]
pub struct RegistrationPipeline {
    store: Arc<dyn MemberStore>,
    notifier: Notifier,
    qr: QrEncoder,
    temp_dir: PathBuf,
    wallet_base_url: Option<String>,
}

impl RegistrationPipeline {
    pub fn new(store: Arc<dyn MemberStore>, notifier: Notifier, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            notifier,
            qr: QrEncoder::default(),
            temp_dir: temp_dir.into(),
            wallet_base_url: None,
        }
    }

    /// Add wallet-pass links under `base_url` to welcome emails
    pub fn with_wallet_base_url(mut self, base_url: Option<String>) -> Self {
        self.wallet_base_url = base_url;
        self
    }

    pub fn store(&self) -> &Arc<dyn MemberStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Register a new member
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        input: MemberRegistration,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let registration = input.normalized();
        validation::validate(&registration).map_err(RegistrationError::Validation)?;

        let id = identity::allocate_member_id();
        let now = Utc::now();
        let render_err = |source: RenderError| RegistrationError::Render {
            member_id: id.clone(),
            source,
        };

        let encoder = self.qr.clone();
        let qr_id = id.clone();
        let issued_at = now.timestamp_millis();
        let qr = blocking(move || encoder.encode(&qr_id, issued_at))
            .await
            .map_err(render_err)?;

        let mut record = MemberRecord {
            id: id.clone(),
            registration,
            date_inscription: now,
            date_debut_abonnement: now,
            date_fin_abonnement: one_year_after(now),
            statut: MemberStatus::Active,
            qr_payload: qr.payload.clone(),
            qr_code_data: qr.data_url.clone(),
            email_envoye: false,
        };

        // Removed with everything in it when dropped, on every return path
        let scratch = self.scratch_dir().await.map_err(render_err)?;
        let card_path = scratch.path().join(format!("membership-{id}.pdf"));
        let (card_record, qr_image, path) = (record.clone(), qr.image.clone(), card_path.clone());
        blocking(move || card::render_card_to_path(&card_record, &qr_image, &path))
            .await
            .map_err(render_err)?;

        self.store
            .create(&record)
            .await
            .map_err(|source| RegistrationError::Persistence {
                member_id: id.clone(),
                source,
            })?;
        tracing::info!(member_id = %id, backend = self.store.backend(), "Member registered");

        if let Err(e) = self.store.store_qr_image(&id, &qr.png).await {
            tracing::warn!(member_id = %id, error = %e, "Failed to store QR image");
        }

        let mail = self.welcome_mail(&record, &card_path);
        let delivery = match self.notifier.dispatch(mail).await {
            Ok(()) => {
                match self.store.mark_email_delivered(&id).await {
                    Ok(()) => record.email_envoye = true,
                    Err(e) => {
                        tracing::warn!(member_id = %id, error = %e, "Email sent but delivery flag not saved");
                    }
                }
                Delivery::Sent
            }
            Err(e) => {
                tracing::warn!(member_id = %id, error = %e, "Membership email not delivered");
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        };

        let removed = tokio::task::spawn_blocking(move || scratch.close())
            .await
            .map_err(std::io::Error::other)
            .and_then(|closed| closed);
        if let Err(e) = removed {
            tracing::warn!(member_id = %id, error = %e, "Scratch directory not removed");
        }
        Ok(RegistrationOutcome { record, delivery })
    }

    /// Render the card of a stored member into memory
    ///
    /// The QR image is rebuilt from the stored payload, which yields the
    /// same image that was issued.
    pub async fn render_card(&self, record: &MemberRecord) -> Result<Vec<u8>, RenderError> {
        let encoder = self.qr.clone();
        let record = record.clone();
        blocking(move || {
            let qr = encoder.encode(&record.id, record.qr_payload.timestamp)?;
            card::render_card_bytes(&record, &qr.image)
        })
        .await
    }

    async fn scratch_dir(&self) -> Result<tempfile::TempDir, RenderError> {
        tokio::fs::create_dir_all(&self.temp_dir).await?;
        let parent = self.temp_dir.clone();
        blocking(move || {
            Ok(tempfile::Builder::new()
                .prefix("carte-")
                .tempdir_in(&parent)?)
        })
        .await
    }

    fn welcome_mail(&self, record: &MemberRecord, card_path: &Path) -> OutgoingMail {
        let wallet: Vec<WalletLink> = self
            .wallet_base_url
            .as_deref()
            .map(|base| template::wallet_links(base, &record.id))
            .unwrap_or_default();

        OutgoingMail {
            to: record.registration.email.clone(),
            subject: template::WELCOME_SUBJECT.to_string(),
            html: template::membership_email_html(record, &wallet),
            attachments: vec![MailAttachment::pdf_file(
                template::card_filename(record),
                card_path,
            )],
        }
    }
}

/// Run rendering work on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T, RenderError>
where
    F: FnOnce() -> Result<T, RenderError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| RenderError::Io(std::io::Error::other(format!("render task failed: {e}"))))?
}
