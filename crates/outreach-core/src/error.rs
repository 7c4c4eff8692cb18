//! Error types for `outreach-core`.

use thiserror::Error;

/// Validation failures raised by the domain model itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  #[error("{field} is required")]
  Required { field: &'static str },

  #[error("{field} must not exceed {max} characters")]
  TooLong { field: &'static str, max: usize },

  #[error("{field} must be between {min} and {max} characters")]
  Length {
    field: &'static str,
    min:   usize,
    max:   usize,
  },

  #[error("please provide a valid email address")]
  InvalidEmail,

  #[error("unknown email status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Field checks ────────────────────────────────────────────────────────────

pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Required { field });
  }
  Ok(())
}

pub(crate) fn max_len(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::TooLong { field, max });
  }
  Ok(())
}

/// A deliberately loose address check: one `@`, a non-empty local part, and a
/// dotted domain. Real validation happens when the transport parses it.
pub fn check_email(value: &str) -> Result<()> {
  require("email", value)?;
  let (local, domain) = value.trim().split_once('@').ok_or(Error::InvalidEmail)?;
  let domain_ok = domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !domain.contains('@');
  if local.is_empty() || !domain_ok || value.chars().any(char::is_whitespace) {
    return Err(Error::InvalidEmail);
  }
  Ok(())
}
