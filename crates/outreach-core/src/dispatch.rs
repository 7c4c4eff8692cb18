//! Bulk dispatch: one message per requested contact, each with the sender's
//! resume attached, and a durable outcome per attempt.
//!
//! Only two things abort a dispatch: an invalid request and an attachment that
//! cannot be resolved. Both are checked before any contact is touched. Every
//! per-contact problem is folded into the returned [`DispatchResult`] as a
//! [`SendOutcome`], and processing moves on to the next id.
//!
//! Contacts are processed sequentially in request order. Each contact's status
//! update and log record are committed as soon as its attempt completes; there
//! is no batch-level rollback.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
  attachment::{Attachment, AttachmentProvider, AttachmentUnavailable},
  contact::{ContactId, EmailStatus},
  send_log::NewSendLog,
  store::{ContactStore, SendLogStore},
  transport::{Envelope, MailTransport},
  user::User,
};

// ─── Request / result ────────────────────────────────────────────────────────

/// What to send, and to whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
  pub contact_ids: Vec<ContactId>,
  pub subject:     String,
  pub body:        String,
}

impl DispatchRequest {
  pub fn validate(&self) -> Result<(), DispatchError> {
    if self.contact_ids.is_empty() {
      return Err(DispatchError::InvalidRequest("At least one HR ID is required"));
    }
    if self.subject.trim().is_empty() {
      return Err(DispatchError::InvalidRequest("Email subject is required"));
    }
    if self.body.trim().is_empty() {
      return Err(DispatchError::InvalidRequest("Email body is required"));
    }
    Ok(())
  }
}

/// Failures that reject the whole dispatch before any contact is processed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
  #[error("{0}")]
  InvalidRequest(&'static str),

  #[error(transparent)]
  AttachmentUnavailable(#[from] AttachmentUnavailable),
}

/// The terminal outcome of one contact within a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
  /// Delivered; contact is `SENT` and a `SENT` record was appended.
  Sent,
  /// Missing or owned by someone else; nothing was mutated or logged.
  NotFound,
  /// The store could not load the contact; nothing was mutated or logged.
  LookupFailed { message: String },
  /// The transport rejected the message; a `FAILED` record carrying
  /// `message` was appended (storage permitting) and the contact marked
  /// `FAILED`. Storage errors are logged but do not replace `message`.
  TransportFailed { email: String, message: String },
  /// Delivered, but saving the contact or its log record failed. The log
  /// append is still attempted when the save fails.
  StorageFailed { email: String, message: String },
}

impl SendOutcome {
  pub fn is_success(&self) -> bool { matches!(self, Self::Sent) }

  /// Human-readable error line for the summary; `None` on success.
  pub fn describe(&self, contact_id: ContactId) -> Option<String> {
    match self {
      Self::Sent => None,
      Self::NotFound => Some(format!("HR contact ID {contact_id} not found")),
      Self::LookupFailed { message } => {
        Some(format!("HR contact ID {contact_id} could not be loaded: {message}"))
      }
      Self::TransportFailed { email, message } => {
        Some(format!("Failed to send to {email}: {message}"))
      }
      Self::StorageFailed { email, message } => {
        Some(format!("Failed to record send to {email}: {message}"))
      }
    }
  }
}

/// Summary returned to the caller. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
  pub total_requested: usize,
  pub success_count:   usize,
  pub failure_count:   usize,
  /// One line per failure, in request order.
  pub errors:          Vec<String>,
}

impl DispatchResult {
  fn new(total_requested: usize) -> Self {
    Self { total_requested, ..Self::default() }
  }

  fn record(&mut self, contact_id: ContactId, outcome: &SendOutcome) {
    match outcome.describe(contact_id) {
      None => self.success_count += 1,
      Some(line) => {
        self.failure_count += 1;
        self.errors.push(line);
      }
    }
  }
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Borrows its collaborators for the duration of a dispatch.
pub struct Dispatcher<'a, C, L, T, A> {
  contacts:    &'a C,
  logs:        &'a L,
  transport:   &'a T,
  attachments: &'a A,
}

impl<'a, C, L, T, A> Dispatcher<'a, C, L, T, A>
where
  C: ContactStore,
  L: SendLogStore,
  T: MailTransport,
  A: AttachmentProvider,
{
  pub fn new(contacts: &'a C, logs: &'a L, transport: &'a T, attachments: &'a A) -> Self {
    Self { contacts, logs, transport, attachments }
  }

  /// Send `request` on behalf of `sender`.
  pub async fn dispatch(
    &self,
    sender: &User,
    request: &DispatchRequest,
  ) -> Result<DispatchResult, DispatchError> {
    request.validate()?;

    let attachment = self.attachments.resolve(sender).await.inspect_err(|e| {
      warn!(user_id = sender.user_id, error = %e, "dispatch rejected: attachment unavailable");
    })?;

    let mut result = DispatchResult::new(request.contact_ids.len());
    for &contact_id in &request.contact_ids {
      let outcome = self.send_one(sender, contact_id, request, &attachment).await;
      result.record(contact_id, &outcome);
    }

    info!(
      user_id = sender.user_id,
      total = result.total_requested,
      sent = result.success_count,
      failed = result.failure_count,
      "dispatch finished"
    );
    Ok(result)
  }

  async fn send_one(
    &self,
    sender: &User,
    contact_id: ContactId,
    request: &DispatchRequest,
    attachment: &Attachment,
  ) -> SendOutcome {
    // Ownership and existence are settled before anything is mutated.
    let mut contact = match self.contacts.get_contact(contact_id).await {
      Ok(Some(c)) if c.is_owned_by(sender.user_id) => c,
      Ok(_) => {
        warn!(contact_id, user_id = sender.user_id, "contact not found for sender");
        return SendOutcome::NotFound;
      }
      Err(e) => {
        error!(contact_id, error = %e, "failed to load contact");
        return SendOutcome::LookupFailed { message: e.to_string() };
      }
    };

    let envelope = Envelope {
      from:       sender.email.clone(),
      to:         contact.email.clone(),
      subject:    request.subject.clone(),
      body_text:  request.body.clone(),
      attachment: attachment.clone(),
    };
    let delivery = self.transport.send(&envelope).await.map_err(|e| e.to_string());

    let log = match &delivery {
      Ok(()) => {
        contact.mark(EmailStatus::Sent, Utc::now());
        NewSendLog::sent(contact_id, sender.user_id)
      }
      Err(message) => {
        contact.mark(EmailStatus::Failed, Utc::now());
        NewSendLog::failed(contact_id, sender.user_id, message.clone())
      }
    };

    // Once the transport has run the attempt is always logged, even if the
    // status update could not be saved.
    let email = contact.email.clone();
    let saved = self.contacts.save_contact(&contact).await.map_err(|e| {
      error!(contact_id, email = %email, error = %e, "failed to save contact status");
      e.to_string()
    });
    let logged = self.logs.append_log(log).await.map_err(|e| {
      error!(contact_id, email = %email, error = %e, "failed to append send log");
      e.to_string()
    });

    match delivery {
      Err(message) => {
        error!(contact_id, email = %email, error = %message, "email send failed");
        SendOutcome::TransportFailed { email, message }
      }
      Ok(()) => match saved.and(logged.map(drop)) {
        Ok(_) => {
          info!(contact_id, email = %email, name = %contact.name, "email sent");
          SendOutcome::Sent
        }
        Err(message) => SendOutcome::StorageFailed { email, message },
      },
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
