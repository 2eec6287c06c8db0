//! SMTP mailer.
//!
//! Wraps a lettre async transport with STARTTLS and optional LOGIN
//! authentication. The transport is built once; lettre pools the underlying
//! connection across sends.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use passwatch_core::error::{DeliveryError, DeliveryResult};
use passwatch_core::traits::Mailer;

use crate::settings::SmtpSettings;

/// Mailer backed by an SMTP relay.
#[derive(Debug)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout_secs: u64,
}

impl SmtpMailer {
    /// Build the transport from settings.
    ///
    /// Fails when the sender address does not parse or the relay host is not
    /// a valid TLS server name. No connection is opened here.
    pub fn new(settings: &SmtpSettings) -> DeliveryResult<Self> {
        let from = parse_mailbox(&settings.from_email)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| {
                DeliveryError::connection_with_source(
                    format!("invalid relay host {}", settings.host),
                    e,
                )
            })?
            .port(settings.port)
            .timeout(Some(std::time::Duration::from_secs(settings.timeout_secs)));

        if let (Some(username), Some(password)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            timeout_secs: settings.timeout_secs,
        })
    }

    fn build_message(&self, to: Mailbox, subject: &str, body: &str) -> DeliveryResult<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DeliveryError::rejected_with_source("failed to assemble message", e))
    }

    fn map_send_error(&self, error: lettre::transport::smtp::Error) -> DeliveryError {
        if error.is_timeout() {
            DeliveryError::timeout(self.timeout_secs)
        } else if error.is_permanent() {
            DeliveryError::rejected_with_source("message rejected by relay", error)
        } else {
            DeliveryError::connection_with_source("failed to deliver message", error)
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DeliveryResult<()> {
        let to_mailbox = parse_mailbox(to)?;
        let message = self.build_message(to_mailbox, subject, body)?;

        debug!(to = %to, subject = %subject, "sending notification mail");

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| self.map_send_error(e))
    }
}

fn parse_mailbox(address: &str) -> DeliveryResult<Mailbox> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DeliveryError::invalid_address(address, e.to_string()))
}
