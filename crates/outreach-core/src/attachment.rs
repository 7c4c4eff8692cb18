//! The shared attachment sent with every message of a dispatch.

use std::future::Future;

use bytes::Bytes;
use thiserror::Error;

use crate::user::User;

/// A resolved, read-only file. Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  /// Name shown to the recipient.
  pub file_name:    String,
  pub content_type: String,
  pub content:      Bytes,
}

/// Why a user's attachment could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentUnavailable {
  #[error("Please upload your resume before sending emails")]
  NotConfigured,

  #[error("Resume file not found. Please re-upload your resume")]
  Missing { path: String },

  #[error("Resume file could not be read: {0}")]
  Unreadable(String),
}

/// Resolves the single stored attachment for a user.
pub trait AttachmentProvider: Send + Sync {
  fn resolve<'a>(
    &'a self,
    user: &'a User,
  ) -> impl Future<Output = Result<Attachment, AttachmentUnavailable>> + Send + 'a;
}

/// MIME type for the resume formats accepted on upload.
pub fn content_type_for(file_name: &str) -> &'static str {
  let ext = file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "pdf" => "application/pdf",
    "doc" => "application/msword",
    "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    _ => "application/octet-stream",
  }
}
