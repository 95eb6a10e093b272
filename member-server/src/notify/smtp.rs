//! SMTP relay (lettre, async on Tokio)

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{AttachmentContent, DeliveryError, Mailer, OutgoingMail, Sender};
use crate::config::{SmtpConfig, SmtpTls};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    timeout: Duration,
}

impl SmtpMailer {
    /// Build the transport; no connection is opened until the first send
    pub fn new(config: &SmtpConfig) -> Result<Self, DeliveryError> {
        let builder = match config.tls {
            SmtpTls::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                    .map_err(|e| DeliveryError::Relay(e.to_string()))?
            }
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| DeliveryError::Relay(e.to_string()))?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            transport,
            timeout: config.timeout,
        })
    }
}

fn build_message(from: &Sender, mail: &OutgoingMail) -> Result<Message, DeliveryError> {
    let from = Mailbox::new(
        Some(from.name.clone()),
        from.address
            .parse()
            .map_err(|_| DeliveryError::Address(from.address.clone()))?,
    );
    let to: Mailbox = mail
        .to
        .parse()
        .map_err(|_| DeliveryError::Address(mail.to.clone()))?;

    let mut body = MultiPart::mixed().singlepart(SinglePart::html(mail.html.clone()));
    for attachment in &mail.attachments {
        let AttachmentContent::Bytes(bytes) = &attachment.content else {
            return Err(DeliveryError::Message(format!(
                "attachment {} was not loaded",
                attachment.filename
            )));
        };
        let content_type = ContentType::parse(&attachment.content_type)
            .map_err(|e| DeliveryError::Message(e.to_string()))?;
        body = body.singlepart(
            Attachment::new(attachment.filename.clone()).body(bytes.clone(), content_type),
        );
    }

    Message::builder()
        .from(from)
        .to(to)
        .subject(mail.subject.clone())
        .multipart(body)
        .map_err(|e| DeliveryError::Message(e.to_string()))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, from: &Sender, mail: &OutgoingMail) -> Result<(), DeliveryError> {
        let message = build_message(from, mail)?;
        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(response)) => {
                tracing::debug!(code = %response.code(), "SMTP relay accepted message");
                Ok(())
            }
            Ok(Err(e)) => Err(DeliveryError::Relay(e.to_string())),
            Err(_) => Err(DeliveryError::Timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MailAttachment;

    fn sender() -> Sender {
        Sender {
            name: "4nap - Fort Napoléon".into(),
            address: "noreply@4nap.fr".into(),
        }
    }

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.into(),
            subject: "Bienvenue".into(),
            html: "<p>Bonjour</p>".into(),
            attachments: vec![MailAttachment {
                filename: "pass.pdf".into(),
                content: AttachmentContent::Bytes(b"%PDF-1.5".to_vec()),
                content_type: "application/pdf".into(),
            }],
        }
    }

    #[test]
    fn message_has_html_and_pdf_parts() {
        let message = build_message(&sender(), &mail("jean@test.fr")).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: jean@test.fr"));
        assert!(raw.contains("multipart/mixed"));
        assert!(raw.contains("text/html"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("pass.pdf"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let err = build_message(&sender(), &mail("not an address")).unwrap_err();
        assert!(matches!(err, DeliveryError::Address(_)));
    }

    #[test]
    fn unloaded_attachment_is_rejected() {
        let mut m = mail("jean@test.fr");
        m.attachments[0].content = AttachmentContent::Path("/tmp/x.pdf".into());
        assert!(matches!(
            build_message(&sender(), &m),
            Err(DeliveryError::Message(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_relay_fails_within_timeout() {
        let config = SmtpConfig {
            host: "127.0.0.1".into(),
            port: 1,
            user: "u".into(),
            password: "p".into(),
            tls: SmtpTls::None,
            timeout: Duration::from_secs(2),
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let result = mailer.send(&sender(), &mail("jean@test.fr")).await;
        assert!(matches!(
            result,
            Err(DeliveryError::Relay(_) | DeliveryError::Timeout(_))
        ));
    }
}
