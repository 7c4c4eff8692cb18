//! The outbound mail seam.

use std::future::Future;

use crate::attachment::Attachment;

/// One message: plain-text body plus a single attachment.
#[derive(Debug, Clone)]
pub struct Envelope {
  pub from:       String,
  pub to:         String,
  pub subject:    String,
  /// Sent verbatim as `text/plain`; never interpreted as HTML.
  pub body_text:  String,
  pub attachment: Attachment,
}

/// Delivers envelopes. Treated as a slow, fallible remote call; callers do not
/// retry. The error's `Display` output is what gets recorded in the send log.
pub trait MailTransport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn send<'a>(
    &'a self,
    envelope: &'a Envelope,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
