//! A transport that logs instead of delivering.

use outreach_core::transport::{Envelope, MailTransport};

use crate::MailError;

/// Accepts every envelope and writes a summary to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

impl MailTransport for ConsoleMailer {
  type Error = MailError;

  async fn send(&self, envelope: &Envelope) -> Result<(), MailError> {
    tracing::info!(
      from = %envelope.from,
      to = %envelope.to,
      subject = %envelope.subject,
      attachment = %envelope.attachment.file_name,
      attachment_bytes = envelope.attachment.content.len(),
      body_chars = envelope.body_text.chars().count(),
      "console mailer: message not delivered"
    );
    Ok(())
  }
}
