//! Storage traits for contacts, send logs and users.
//!
//! The traits are implemented by storage backends (e.g.
//! `outreach-store-sqlite`). Higher layers depend on these abstractions, not
//! on any concrete backend. They share one error type through [`Store`], so a
//! single backend can implement all three without ambiguity.
//!
//! Ownership is never checked here: callers compare
//! [`Contact::owner_id`] against the caller themselves.

use std::future::Future;

use crate::{
  contact::{Contact, ContactFields, ContactId, ContactQuery, ContactStats, Page},
  send_log::{NewSendLog, SendLogRecord},
  user::{NewUser, User, UserId},
};

/// Common supertrait carrying the backend's error type.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Contacts ────────────────────────────────────────────────────────────────

pub trait ContactStore: Store {
  /// Persist a new contact owned by `owner_id` with status `PENDING`.
  fn create_contact(
    &self,
    owner_id: UserId,
    fields: ContactFields,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Retrieve a contact by id. Returns `None` if not found.
  fn get_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + '_;

  /// Write back every mutable column of `contact`.
  ///
  /// `owner_id` and `created_at` are never written. Returns the stored row.
  fn save_contact<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + 'a;

  /// Delete a contact. Its send history is kept. Returns `false` if it did
  /// not exist.
  fn delete_contact(
    &self,
    id: ContactId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// One page of an owner's contacts, newest first.
  fn list_contacts<'a>(
    &'a self,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<Page<Contact>, Self::Error>> + Send + 'a;

  fn contact_stats(
    &self,
    owner_id: UserId,
  ) -> impl Future<Output = Result<ContactStats, Self::Error>> + Send + '_;
}

// ─── Send log ────────────────────────────────────────────────────────────────

/// Append-only record of send attempts. No update or delete is exposed.
pub trait SendLogStore: Store {
  /// Append a record; `log_id` and `sent_at` are assigned by the store.
  fn append_log(
    &self,
    input: NewSendLog,
  ) -> impl Future<Output = Result<SendLogRecord, Self::Error>> + Send + '_;

  /// All records for a contact, newest first.
  fn logs_for_contact(
    &self,
    contact_id: ContactId,
  ) -> impl Future<Output = Result<Vec<SendLogRecord>, Self::Error>> + Send + '_;
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub trait UserStore: Store {
  /// Create a user. Returns `None` if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Point the user's resume at a newly stored file. Returns the updated
  /// user, or `None` if the user does not exist.
  fn set_resume(
    &self,
    id: UserId,
    path: String,
    original_name: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
