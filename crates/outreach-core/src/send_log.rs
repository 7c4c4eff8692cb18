//! Send log: one immutable record per send attempt.
//!
//! Records are append-only. `PENDING` is never logged, and the error text is
//! present exactly when the outcome is `FAILED`; [`NewSendLog`] only offers
//! constructors that uphold that.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  contact::{ContactId, EmailStatus},
  user::UserId,
};

pub type LogId = i64;

/// A persisted send attempt. `sent_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendLogRecord {
  pub log_id:        LogId,
  pub contact_id:    ContactId,
  pub user_id:       UserId,
  pub status:        EmailStatus,
  pub error_message: Option<String>,
  pub sent_at:       DateTime<Utc>,
}

/// Input to [`SendLogStore::append_log`](crate::store::SendLogStore::append_log).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSendLog {
  contact_id:    ContactId,
  user_id:       UserId,
  status:        EmailStatus,
  error_message: Option<String>,
}

impl NewSendLog {
  pub fn sent(contact_id: ContactId, user_id: UserId) -> Self {
    Self { contact_id, user_id, status: EmailStatus::Sent, error_message: None }
  }

  pub fn failed(contact_id: ContactId, user_id: UserId, message: impl Into<String>) -> Self {
    Self {
      contact_id,
      user_id,
      status: EmailStatus::Failed,
      error_message: Some(message.into()),
    }
  }

  pub fn contact_id(&self) -> ContactId { self.contact_id }

  pub fn user_id(&self) -> UserId { self.user_id }

  pub fn status(&self) -> EmailStatus { self.status }

  pub fn error_message(&self) -> Option<&str> { self.error_message.as_deref() }

  /// Stamp the record with its store-assigned id and time.
  pub fn into_record(self, log_id: LogId, sent_at: DateTime<Utc>) -> SendLogRecord {
    SendLogRecord {
      log_id,
      contact_id: self.contact_id,
      user_id: self.user_id,
      status: self.status,
      error_message: self.error_message,
      sent_at,
    }
  }
}
