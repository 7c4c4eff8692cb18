//! [`SqliteStore`], the SQLite implementation of the outreach store traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use outreach_core::{
  contact::{Contact, ContactFields, ContactId, ContactQuery, ContactStats, EmailStatus, Page},
  send_log::{NewSendLog, SendLogRecord},
  store::{ContactStore, SendLogStore, Store, UserStore},
  user::{NewUser, User, UserId},
};

use crate::{
  Error, Result,
  encode::{
    CONTACT_COLUMNS, LOG_COLUMNS, RawContact, RawLog, RawUser, USER_COLUMNS, decode_status,
    encode_day_end, encode_day_start, encode_dt, encode_status,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Contacts, users and send logs backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl Store for SqliteStore {
  type Error = Error;
}

// ─── ContactStore impl ───────────────────────────────────────────────────────

impl ContactStore for SqliteStore {
  async fn create_contact(&self, owner_id: UserId, fields: ContactFields) -> Result<Contact> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let status_str = encode_status(EmailStatus::Pending);
    let row        = fields.clone();

    let contact_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contacts (
             owner_id, name, email, phone, company, job_role, notes,
             email_status, email_sent_at, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL, ?9)",
          rusqlite::params![
            owner_id,
            row.name,
            row.email,
            row.phone,
            row.company,
            row.job_role,
            row.notes,
            status_str,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Contact {
      contact_id,
      owner_id,
      name: fields.name,
      email: fields.email,
      phone: fields.phone,
      company: fields.company,
      job_role: fields.job_role,
      notes: fields.notes,
      email_status: EmailStatus::Pending,
      email_sent_at: None,
      created_at,
    })
  }

  async fn get_contact(&self, id: ContactId) -> Result<Option<Contact>> {
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
            rusqlite::params![id],
            RawContact::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  async fn save_contact(&self, contact: &Contact) -> Result<Contact> {
    let id         = contact.contact_id;
    let c          = contact.clone();
    let status_str = encode_status(contact.email_status);
    let sent_str   = contact.email_sent_at.map(encode_dt);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts
              SET name = ?2, email = ?3, phone = ?4, company = ?5,
                  job_role = ?6, notes = ?7, email_status = ?8, email_sent_at = ?9
            WHERE contact_id = ?1",
          rusqlite::params![
            c.contact_id,
            c.name,
            c.email,
            c.phone,
            c.company,
            c.job_role,
            c.notes,
            status_str,
            sent_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ContactNotFound(id));
    }
    self.get_contact(id).await?.ok_or(Error::ContactNotFound(id))
  }

  async fn delete_contact(&self, id: ContactId) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM contacts WHERE contact_id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn list_contacts(&self, query: &ContactQuery) -> Result<Page<Contact>> {
    let owner_id   = query.owner_id;
    let status_str = query.status.map(encode_status);
    let company    = query
      .company
      .as_deref()
      .map(str::trim)
      .filter(|c| !c.is_empty())
      .map(str::to_owned);
    let start_str  = query.start_date.map(encode_day_start);
    let end_str    = query.end_date.map(encode_day_end);
    let page       = query.page;
    let size       = query.page_size();
    let limit_val  = i64::from(size);
    let offset_val = i64::try_from(query.offset()).unwrap_or(i64::MAX);

    // Every filter is optional; a NULL parameter disables its clause.
    const FILTER: &str = "
      WHERE owner_id = ?1
        AND (?2 IS NULL OR email_status = ?2)
        AND (?3 IS NULL OR LOWER(company) LIKE '%' || LOWER(?3) || '%')
        AND (?4 IS NULL OR created_at >= ?4)
        AND (?5 IS NULL OR created_at <  ?5)";

    let (total, raws): (i64, Vec<RawContact>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM contacts {FILTER}"),
          rusqlite::params![owner_id, status_str, company, start_str, end_str],
          |r| r.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {CONTACT_COLUMNS} FROM contacts {FILTER}
           ORDER BY created_at DESC, contact_id DESC
           LIMIT ?6 OFFSET ?7"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              owner_id, status_str, company, start_str, end_str, limit_val, offset_val,
            ],
            RawContact::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let content = raws
      .into_iter()
      .map(RawContact::into_contact)
      .collect::<Result<Vec<_>>>()?;

    Ok(Page::new(content, page, size, u64::try_from(total).unwrap_or(0)))
  }

  async fn contact_stats(&self, owner_id: UserId) -> Result<ContactStats> {
    let counts: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT email_status, COUNT(*) FROM contacts
            WHERE owner_id = ?1
            GROUP BY email_status",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner_id], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut stats = ContactStats::default();
    for (status, count) in counts {
      let count = u64::try_from(count).unwrap_or(0);
      stats.total += count;
      match decode_status(&status)? {
        EmailStatus::Pending => stats.pending += count,
        EmailStatus::Sent => stats.sent += count,
        EmailStatus::Failed => stats.failed += count,
      }
    }
    Ok(stats)
  }
}

// ─── SendLogStore impl ───────────────────────────────────────────────────────

impl SendLogStore for SqliteStore {
  async fn append_log(&self, input: NewSendLog) -> Result<SendLogRecord> {
    let sent_at    = Utc::now();
    let at_str     = encode_dt(sent_at);
    let contact_id = input.contact_id();
    let user_id    = input.user_id();
    let status_str = encode_status(input.status());
    let error_msg  = input.error_message().map(str::to_owned);

    let log_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO send_logs (contact_id, user_id, status, error_message, sent_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![contact_id, user_id, status_str, error_msg, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(input.into_record(log_id, sent_at))
  }

  async fn logs_for_contact(&self, contact_id: ContactId) -> Result<Vec<SendLogRecord>> {
    let raws: Vec<RawLog> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LOG_COLUMNS} FROM send_logs
            WHERE contact_id = ?1
            ORDER BY sent_at DESC, log_id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![contact_id], RawLog::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLog::into_record).collect()
  }
}

// ─── UserStore impl ──────────────────────────────────────────────────────────

impl UserStore for SqliteStore {
  async fn create_user(&self, input: NewUser) -> Result<Option<User>> {
    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let row        = input.clone();

    let user_id: Option<i64> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO users (full_name, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![row.full_name, row.email, row.password_hash, at_str],
        );
        match inserted {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(None)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(user_id) = user_id else {
      tracing::debug!(email = %input.email, "signup rejected: email already registered");
      return Ok(None);
    };

    Ok(Some(User {
      user_id,
      full_name: input.full_name,
      email: input.email,
      password_hash: input.password_hash,
      resume_path: None,
      resume_original_name: None,
      created_at,
    }))
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.trim().to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn set_resume(
    &self,
    id: UserId,
    path: String,
    original_name: String,
  ) -> Result<Option<User>> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET resume_path = ?2, resume_original_name = ?3 WHERE user_id = ?1",
          rusqlite::params![id, path, original_name],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_user(id).await
  }
}
