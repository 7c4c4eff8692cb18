//! SMTP delivery through lettre's tokio transport.

use std::time::Duration;

use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use outreach_core::transport::{Envelope, MailTransport};
use serde::Deserialize;

use crate::MailError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
  /// Plain connection upgraded with STARTTLS (usually port 587).
  #[default]
  Starttls,
  /// Implicit TLS from the first byte (usually port 465).
  Tls,
  /// Unencrypted. Only for local test relays.
  None,
}

/// The `[smtp]` section of the server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub username:     Option<String>,
  pub password:     Option<String>,
  #[serde(default)]
  pub tls:          TlsMode,
  /// Per-message timeout; an expired send is reported as a failure.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_port() -> u16 { 587 }

fn default_timeout_secs() -> u64 { 30 }

// ─── Mailer ───────────────────────────────────────────────────────────────────

/// Sends each envelope as a `multipart/mixed` message through one relay.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
  pub fn new(cfg: &SmtpConfig) -> Result<Self, MailError> {
    let builder = match cfg.tls {
      TlsMode::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?,
      TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?,
      TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host),
    };

    let mut builder = builder
      .port(cfg.port)
      .timeout(Some(Duration::from_secs(cfg.timeout_secs)));

    if let (Some(user), Some(pass)) = (&cfg.username, &cfg.password) {
      builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
    }

    tracing::info!(host = %cfg.host, port = cfg.port, tls = ?cfg.tls, "SMTP mailer configured");
    Ok(Self { transport: builder.build() })
  }
}

impl MailTransport for SmtpMailer {
  type Error = MailError;

  async fn send(&self, envelope: &Envelope) -> Result<(), MailError> {
    let message = build_message(envelope)?;
    let response = self.transport.send(message).await?;
    tracing::debug!(to = %envelope.to, code = %response.code(), "relay accepted message");
    Ok(())
  }
}

// ─── Message assembly ─────────────────────────────────────────────────────────

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
  address.trim().parse().map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
    address: address.to_owned(),
    reason:  e.to_string(),
  })
}

/// Build the MIME message for `envelope`: the body as UTF-8 `text/plain`,
/// followed by the attachment under its display name.
pub fn build_message(envelope: &Envelope) -> Result<Message, MailError> {
  let attachment = &envelope.attachment;
  let content_type = ContentType::parse(&attachment.content_type)
    .map_err(|e| MailError::Build(format!("attachment content type: {e}")))?;

  let parts = MultiPart::mixed()
    .singlepart(SinglePart::plain(envelope.body_text.clone()))
    .singlepart(
      Attachment::new(attachment.file_name.clone())
        .body(attachment.content.to_vec(), content_type),
    );

  Message::builder()
    .from(mailbox(&envelope.from)?)
    .to(mailbox(&envelope.to)?)
    .subject(envelope.subject.clone())
    .multipart(parts)
    .map_err(|e| MailError::Build(e.to_string()))
}
