//! Contacts: the HR outreach targets a user sends mail to.
//!
//! A contact's descriptive fields are edited through [`ContactFields`]; its
//! [`EmailStatus`] is only ever changed by the dispatch orchestrator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result, check_email, max_len, require},
  user::UserId,
};

pub type ContactId = i64;

// ─── Status ──────────────────────────────────────────────────────────────────

/// Outcome of the most recent send attempt to a contact.
///
/// `Pending` is the only initial state. `Sent` and `Failed` are not terminal:
/// any contact can be dispatched to again.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum EmailStatus {
  #[default]
  Pending,
  Sent,
  Failed,
}

impl EmailStatus {
  /// Parse a status filter value, case-insensitively.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A stored outreach target, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:    ContactId,
  /// Immutable after creation; stores never write this column on save.
  pub owner_id:      UserId,
  pub name:          String,
  pub email:         String,
  pub phone:         Option<String>,
  pub company:       String,
  pub job_role:      Option<String>,
  pub notes:         Option<String>,
  pub email_status:  EmailStatus,
  /// Set on every send attempt, successful or not.
  pub email_sent_at: Option<DateTime<Utc>>,
  pub created_at:    DateTime<Utc>,
}

impl Contact {
  pub fn is_owned_by(&self, user_id: UserId) -> bool { self.owner_id == user_id }

  /// Overwrite the descriptive fields. Status and timestamps are untouched.
  pub fn apply(&mut self, fields: ContactFields) {
    self.name = fields.name;
    self.email = fields.email;
    self.phone = fields.phone;
    self.company = fields.company;
    self.job_role = fields.job_role;
    self.notes = fields.notes;
  }

  /// Record the outcome of a send attempt made at `at`.
  pub fn mark(&mut self, status: EmailStatus, at: DateTime<Utc>) {
    self.email_status = status;
    self.email_sent_at = Some(at);
  }
}

// ─── Editable fields ─────────────────────────────────────────────────────────

/// User-editable contact fields, used for both creation and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
  pub name:     String,
  pub email:    String,
  #[serde(default)]
  pub phone:    Option<String>,
  pub company:  String,
  #[serde(default)]
  pub job_role: Option<String>,
  #[serde(default)]
  pub notes:    Option<String>,
}

impl ContactFields {
  pub fn validate(&self) -> Result<()> {
    require("name", &self.name)?;
    max_len("name", &self.name, 100)?;
    check_email(&self.email)?;
    if let Some(phone) = &self.phone {
      max_len("phone", phone, 20)?;
    }
    require("company", &self.company)?;
    max_len("company", &self.company, 150)?;
    if let Some(role) = &self.job_role {
      max_len("job_role", role, 150)?;
    }
    Ok(())
  }
}

// ─── Query types ─────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Parameters for [`ContactStore::list_contacts`](crate::store::ContactStore::list_contacts).
#[derive(Debug, Clone)]
pub struct ContactQuery {
  pub owner_id:   UserId,
  pub status:     Option<EmailStatus>,
  /// Case-insensitive substring match on the company name.
  pub company:    Option<String>,
  /// Inclusive lower bound on the creation date.
  pub start_date: Option<NaiveDate>,
  /// Inclusive upper bound on the creation date (whole day).
  pub end_date:   Option<NaiveDate>,
  /// Zero-based page index.
  pub page:       u32,
  pub size:       u32,
}

impl ContactQuery {
  pub fn for_owner(owner_id: UserId) -> Self {
    Self {
      owner_id,
      status: None,
      company: None,
      start_date: None,
      end_date: None,
      page: 0,
      size: DEFAULT_PAGE_SIZE,
    }
  }

  pub fn page_size(&self) -> u32 { self.size.clamp(1, MAX_PAGE_SIZE) }

  pub fn offset(&self) -> u64 { u64::from(self.page) * u64::from(self.page_size()) }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub content:        Vec<T>,
  pub page:           u32,
  pub size:           u32,
  pub total_elements: u64,
  pub total_pages:    u64,
  pub last:           bool,
}

impl<T> Page<T> {
  pub fn new(content: Vec<T>, page: u32, size: u32, total_elements: u64) -> Self {
    let total_pages = total_elements.div_ceil(u64::from(size.max(1)));
    Self {
      content,
      page,
      size,
      total_elements,
      total_pages,
      last: u64::from(page) + 1 >= total_pages,
    }
  }
}

/// Per-status contact counts for one owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactStats {
  pub total:   u64,
  pub sent:    u64,
  pub pending: u64,
  pub failed:  u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fields() -> ContactFields {
    ContactFields {
      name:     "Dana Reyes".into(),
      email:    "dana@acme.example".into(),
      phone:    None,
      company:  "Acme".into(),
      job_role: Some("Talent Partner".into()),
      notes:    None,
    }
  }

  fn contact() -> Contact {
    let f = fields();
    Contact {
      contact_id:    1,
      owner_id:      7,
      name:          f.name,
      email:         f.email,
      phone:         f.phone,
      company:       f.company,
      job_role:      f.job_role,
      notes:         f.notes,
      email_status:  EmailStatus::Pending,
      email_sent_at: None,
      created_at:    Utc::now(),
    }
  }

  #[test]
  fn status_parses_case_insensitively() {
    assert_eq!(EmailStatus::parse("sent").unwrap(), EmailStatus::Sent);
    assert_eq!(EmailStatus::parse(" FAILED ").unwrap(), EmailStatus::Failed);
    assert!(EmailStatus::parse("bounced").is_err());
    assert_eq!(EmailStatus::Pending.to_string(), "PENDING");
  }

  #[test]
  fn apply_keeps_status_and_owner() {
    let mut c = contact();
    let at = Utc::now();
    c.mark(EmailStatus::Failed, at);

    let mut edit = fields();
    edit.company = "Globex".into();
    c.apply(edit);

    assert_eq!(c.company, "Globex");
    assert_eq!(c.owner_id, 7);
    assert_eq!(c.email_status, EmailStatus::Failed);
    assert_eq!(c.email_sent_at, Some(at));
  }

  #[test]
  fn ownership_is_by_id() {
    let c = contact();
    assert!(c.is_owned_by(7));
    assert!(!c.is_owned_by(8));
  }

  #[test]
  fn validate_enforces_limits() {
    assert!(fields().validate().is_ok());

    let mut f = fields();
    f.name = " ".into();
    assert_eq!(f.validate(), Err(Error::Required { field: "name" }));

    let mut f = fields();
    f.phone = Some("1".repeat(21));
    assert_eq!(f.validate(), Err(Error::TooLong { field: "phone", max: 20 }));

    let mut f = fields();
    f.email = "not-an-address".into();
    assert_eq!(f.validate(), Err(Error::InvalidEmail));
  }

  #[test]
  fn page_totals() {
    let p = Page::new(vec![1, 2, 3], 0, 3, 7);
    assert_eq!(p.total_pages, 3);
    assert!(!p.last);

    let p = Page::new(vec![7], 2, 3, 7);
    assert!(p.last);

    let empty: Page<i32> = Page::new(vec![], 0, 10, 0);
    assert_eq!(empty.total_pages, 0);
    assert!(empty.last);
  }

  #[test]
  fn query_clamps_page_size() {
    let mut q = ContactQuery::for_owner(1);
    q.size = 0;
    assert_eq!(q.page_size(), 1);
    q.size = 10_000;
    q.page = 2;
    assert_eq!(q.page_size(), MAX_PAGE_SIZE);
    assert_eq!(q.offset(), 200);
  }
}
