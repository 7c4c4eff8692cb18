//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that lexicographic order in SQL matches chronological order.
//! Statuses are stored as their upper-case names.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use outreach_core::{
  contact::{Contact, EmailStatus},
  send_log::SendLogRecord,
  user::User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

/// Midnight UTC at the start of `date`.
pub fn encode_day_start(date: NaiveDate) -> String {
  encode_dt(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Midnight UTC at the start of the day after `date`, for exclusive bounds.
pub fn encode_day_end(date: NaiveDate) -> String {
  let next = date.succ_opt().unwrap_or(NaiveDate::MAX);
  encode_day_start(next)
}

// ─── EmailStatus ─────────────────────────────────────────────────────────────

pub fn encode_status(s: EmailStatus) -> &'static str {
  match s {
    EmailStatus::Pending => "PENDING",
    EmailStatus::Sent => "SENT",
    EmailStatus::Failed => "FAILED",
  }
}

pub fn decode_status(s: &str) -> Result<EmailStatus> { Ok(EmailStatus::parse(s)?) }

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const CONTACT_COLUMNS: &str = "contact_id, owner_id, name, email, phone, company, job_role, \
                                   notes, email_status, email_sent_at, created_at";

/// A `contacts` row before timestamp and status decoding.
pub struct RawContact {
  pub contact_id:    i64,
  pub owner_id:      i64,
  pub name:          String,
  pub email:         String,
  pub phone:         Option<String>,
  pub company:       String,
  pub job_role:      Option<String>,
  pub notes:         Option<String>,
  pub email_status:  String,
  pub email_sent_at: Option<String>,
  pub created_at:    String,
}

impl RawContact {
  /// Read a row selected with [`CONTACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:    row.get(0)?,
      owner_id:      row.get(1)?,
      name:          row.get(2)?,
      email:         row.get(3)?,
      phone:         row.get(4)?,
      company:       row.get(5)?,
      job_role:      row.get(6)?,
      notes:         row.get(7)?,
      email_status:  row.get(8)?,
      email_sent_at: row.get(9)?,
      created_at:    row.get(10)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:    self.contact_id,
      owner_id:      self.owner_id,
      name:          self.name,
      email:         self.email,
      phone:         self.phone,
      company:       self.company,
      job_role:      self.job_role,
      notes:         self.notes,
      email_status:  decode_status(&self.email_status)?,
      email_sent_at: decode_opt_dt(self.email_sent_at)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const USER_COLUMNS: &str =
  "user_id, full_name, email, password_hash, resume_path, resume_original_name, created_at";

pub struct RawUser {
  pub user_id:              i64,
  pub full_name:            String,
  pub email:                String,
  pub password_hash:        String,
  pub resume_path:          Option<String>,
  pub resume_original_name: Option<String>,
  pub created_at:           String,
}

impl RawUser {
  /// Read a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:              row.get(0)?,
      full_name:            row.get(1)?,
      email:                row.get(2)?,
      password_hash:        row.get(3)?,
      resume_path:          row.get(4)?,
      resume_original_name: row.get(5)?,
      created_at:           row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:              self.user_id,
      full_name:            self.full_name,
      email:                self.email,
      password_hash:        self.password_hash,
      resume_path:          self.resume_path,
      resume_original_name: self.resume_original_name,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}

pub const LOG_COLUMNS: &str = "log_id, contact_id, user_id, status, error_message, sent_at";

pub struct RawLog {
  pub log_id:        i64,
  pub contact_id:    i64,
  pub user_id:       i64,
  pub status:        String,
  pub error_message: Option<String>,
  pub sent_at:       String,
}

impl RawLog {
  /// Read a row selected with [`LOG_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log_id:        row.get(0)?,
      contact_id:    row.get(1)?,
      user_id:       row.get(2)?,
      status:        row.get(3)?,
      error_message: row.get(4)?,
      sent_at:       row.get(5)?,
    })
  }

  pub fn into_record(self) -> Result<SendLogRecord> {
    Ok(SendLogRecord {
      log_id:        self.log_id,
      contact_id:    self.contact_id,
      user_id:       self.user_id,
      status:        decode_status(&self.status)?,
      error_message: self.error_message,
      sent_at:       decode_dt(&self.sent_at)?,
    })
  }
}
