//! Application state

use std::sync::Arc;

use crate::BoxError;
use crate::config::Config;
use crate::notify::{Mailer, Notifier, Sender, SmtpMailer};
use crate::registration::RegistrationPipeline;
use crate::store::{FirestoreStore, JsonFileStore, MemberStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Registration pipeline (owns the store and notifier)
    pub pipeline: RegistrationPipeline,
    /// Environment name, reported by the health endpoint
    pub environment: String,
}

impl AppState {
    /// Build the stores and relay selected by `config`
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn MemberStore> = match &config.firestore {
            Some(fs) => {
                tracing::info!(project = %fs.project_id, collection = %fs.collection, "Using Firestore record store");
                Arc::new(FirestoreStore::new(fs)?)
            }
            None => {
                let path = config.members_file();
                tracing::info!(path = %path.display(), "Using JSON file record store");
                Arc::new(JsonFileStore::new(path).with_qr_dir(&config.qr_dir))
            }
        };

        let (relay, address) = match &config.smtp {
            Some(smtp) => {
                tracing::info!(host = %smtp.host, port = smtp.port, "SMTP relay configured");
                let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(smtp)?);
                (Some(mailer), smtp.user.clone())
            }
            None => {
                tracing::warn!("SMTP relay not configured, membership emails will not be sent");
                (None, String::new())
            }
        };

        let notifier = Notifier::new(
            relay,
            Sender {
                name: config.mail_from_name.clone(),
                address,
            },
        );

        let pipeline = RegistrationPipeline::new(store, notifier, &config.temp_dir)
            .with_wallet_base_url(config.wallet_pass_base_url.clone());

        Ok(Self::from_pipeline(pipeline, &config.environment))
    }

    /// State around an already assembled pipeline
    pub fn from_pipeline(pipeline: RegistrationPipeline, environment: &str) -> Self {
        Self {
            pipeline,
            environment: environment.to_string(),
        }
    }

    pub fn store(&self) -> &Arc<dyn MemberStore> {
        self.pipeline.store()
    }
}
