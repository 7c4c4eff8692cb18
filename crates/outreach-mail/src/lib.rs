//! Mail transports for outreach dispatch.
//!
//! - [`SmtpMailer`] delivers through an SMTP relay using [lettre](https://lettre.rs).
//! - [`ConsoleMailer`] only logs the envelope; used when no relay is configured.
//! - [`Mailer`] picks one of the two at startup and implements
//!   [`MailTransport`] for whichever it holds.
//!
//! Every failure, from an unparsable recipient to an SMTP rejection, surfaces
//! as a [`MailError`] whose `Display` output is recorded in the send log.

mod console;
mod smtp;

pub use console::ConsoleMailer;
pub use smtp::{SmtpConfig, SmtpMailer, TlsMode, build_message};

use outreach_core::transport::{Envelope, MailTransport};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
  #[error("invalid email address {address:?}: {reason}")]
  InvalidAddress { address: String, reason: String },

  #[error("failed to build message: {0}")]
  Build(String),

  /// Relay setup or delivery failure; displayed as the relay's own message.
  #[error("{0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
}

/// The transport chosen at startup.
#[derive(Clone)]
pub enum Mailer {
  Smtp(SmtpMailer),
  Console(ConsoleMailer),
}

impl Mailer {
  /// SMTP when a relay is configured, console logging otherwise.
  pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, MailError> {
    match smtp {
      Some(cfg) => Ok(Self::Smtp(SmtpMailer::new(cfg)?)),
      None => {
        tracing::warn!("no SMTP relay configured; outgoing mail will only be logged");
        Ok(Self::Console(ConsoleMailer))
      }
    }
  }
}

impl MailTransport for Mailer {
  type Error = MailError;

  async fn send(&self, envelope: &Envelope) -> Result<(), MailError> {
    match self {
      Mailer::Smtp(m) => m.send(envelope).await,
      Mailer::Console(m) => m.send(envelope).await,
    }
  }
}
