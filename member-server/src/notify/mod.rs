//! Notification dispatch
//!
//! [`Notifier`] sends one message through the configured relay: one attempt,
//! no retry, no queue. Without a relay it reports `NotConfigured` without
//! touching the network.

mod smtp;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use smtp::SmtpMailer;

/// Delivery errors (never fatal to a registration)
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("mail relay is not configured")]
    NotConfigured,

    #[error("invalid address: {0}")]
    Address(String),

    #[error("could not build message: {0}")]
    Message(String),

    #[error("attachment unavailable: {0}")]
    Attachment(#[from] std::io::Error),

    #[error("relay rejected or failed the send: {0}")]
    Relay(String),

    #[error("relay did not answer within {0:?}")]
    Timeout(Duration),
}

/// Attachment body
#[derive(Debug, Clone)]
pub enum AttachmentContent {
    Bytes(Vec<u8>),
    /// Read when the message is dispatched
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub filename: String,
    pub content: AttachmentContent,
    pub content_type: String,
}

impl MailAttachment {
    pub fn pdf_file(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            content: AttachmentContent::Path(path.into()),
            content_type: "application/pdf".to_string(),
        }
    }
}

/// A transactional email
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<MailAttachment>,
}

/// From header
#[derive(Debug, Clone)]
pub struct Sender {
    pub name: String,
    pub address: String,
}

/// A mail relay
///
/// Called with attachments already loaded (`AttachmentContent::Bytes`).
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, from: &Sender, mail: &OutgoingMail) -> Result<(), DeliveryError>;
}

/// Sends notifications through an optional relay
#[derive(Clone)]
pub struct Notifier {
    relay: Option<Arc<dyn Mailer>>,
    sender: Sender,
}

impl Notifier {
    pub fn new(relay: Option<Arc<dyn Mailer>>, sender: Sender) -> Self {
        Self { relay, sender }
    }

    /// Notifier that always reports `NotConfigured`
    pub fn disabled(sender: Sender) -> Self {
        Self::new(None, sender)
    }

    pub fn is_configured(&self) -> bool {
        self.relay.is_some()
    }

    /// Send `mail` once
    pub async fn dispatch(&self, mut mail: OutgoingMail) -> Result<(), DeliveryError> {
        let Some(relay) = &self.relay else {
            return Err(DeliveryError::NotConfigured);
        };

        for attachment in &mut mail.attachments {
            if let AttachmentContent::Path(path) = &attachment.content {
                let bytes = tokio::fs::read(path).await?;
                attachment.content = AttachmentContent::Bytes(bytes);
            }
        }

        relay.send(&self.sender, &mail).await?;
        tracing::info!(to = %mail.to, attachments = mail.attachments.len(), "Email sent");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    fn mail(attachments: Vec<MailAttachment>) -> OutgoingMail {
        OutgoingMail {
            to: "jean@test.fr".into(),
            subject: "Bienvenue".into(),
            html: "<p>ok</p>".into(),
            attachments,
        }
    }

    #[tokio::test]
    async fn unconfigured_relay_short_circuits() {
        let notifier = Notifier::disabled(sender());
        assert!(!notifier.is_configured());
        assert!(matches!(
            notifier.dispatch(mail(vec![])).await,
            Err(DeliveryError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn path_attachments_are_loaded_before_send() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.pdf");
        std::fs::write(&path, b"%PDF-test").unwrap();

        let relay = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(Some(relay.clone()), sender());
        notifier
            .dispatch(mail(vec![MailAttachment::pdf_file("card.pdf", &path)]))
            .await
            .unwrap();

        let sent = relay.sent.lock().await;
        assert_eq!(sent.len(), 1);
        match &sent[0].attachments[0].content {
            AttachmentContent::Bytes(b) => assert_eq!(b, b"%PDF-test"),
            AttachmentContent::Path(_) => panic!("attachment not loaded"),
        }
    }

    #[tokio::test]
    async fn missing_attachment_file_fails_without_sending() {
        let relay = Arc::new(RecordingMailer::default());
        let notifier = Notifier::new(Some(relay.clone()), sender());
        let result = notifier
            .dispatch(mail(vec![MailAttachment::pdf_file(
                "card.pdf",
                "/nonexistent/card.pdf",
            )]))
            .await;
        assert!(matches!(result, Err(DeliveryError::Attachment(_))));
        assert!(relay.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn relay_failure_is_reported() {
        let notifier = Notifier::new(Some(Arc::new(FailingMailer)), sender());
        assert!(matches!(
            notifier.dispatch(mail(vec![])).await,
            Err(DeliveryError::Relay(_))
        ));
    }
}
