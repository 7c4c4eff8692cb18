//! Handlers for `/api/contacts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/contacts` | `?status&company&start_date&end_date&page&size` |
//! | `POST`   | `/api/contacts` | 201; status starts `PENDING` |
//! | `GET`    | `/api/contacts/stats` | counts per status |
//! | `GET`    | `/api/contacts/{id}` | 404 if missing or owned by someone else |
//! | `PUT`    | `/api/contacts/{id}` | edits descriptive fields only |
//! | `DELETE` | `/api/contacts/{id}` | 204 |
//! | `GET`    | `/api/contacts/{id}/logs` | send history, newest first |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use outreach_core::{
  contact::{
    Contact, ContactFields, ContactId, ContactQuery, ContactStats, DEFAULT_PAGE_SIZE,
    EmailStatus, Page,
  },
  send_log::SendLogRecord,
  user::User,
};
use serde::Deserialize;

use crate::{
  AppState, Backend, Transport,
  auth::AuthUser,
  error::Error,
  extract::{JsonBody, PathParam, QueryParams},
};

/// Load a contact only if `user` owns it. Foreign contacts look missing.
async fn owned_contact<S: Backend>(store: &S, user: &User, id: ContactId) -> Result<Contact, Error> {
  store
    .get_contact(id)
    .await
    .map_err(Error::store)?
    .filter(|c| c.is_owned_by(user.user_id))
    .ok_or_else(|| Error::NotFound(format!("HR contact not found with id: {id}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub status:     Option<String>,
  pub company:    Option<String>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub page:       Option<u32>,
  pub size:       Option<u32>,
}

impl ListParams {
  fn into_query(self, owner: &User) -> ContactQuery {
    let status = self.status.as_deref().filter(|s| !s.trim().is_empty()).and_then(|s| {
      EmailStatus::parse(s)
        .inspect_err(|_| tracing::debug!(status = s, "ignoring unknown status filter"))
        .ok()
    });
    ContactQuery {
      status,
      company: self.company.filter(|c| !c.trim().is_empty()),
      start_date: self.start_date,
      end_date: self.end_date,
      page: self.page.unwrap_or(0),
      size: self.size.unwrap_or(DEFAULT_PAGE_SIZE),
      ..ContactQuery::for_owner(owner.user_id)
    }
  }
}

/// `GET /api/contacts`
pub async fn list<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Page<Contact>>, Error>
where
  S: Backend,
  M: Transport,
{
  let query = params.into_query(&user);
  let page = state.store.list_contacts(&query).await.map_err(Error::store)?;
  Ok(Json(page))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/contacts`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  JsonBody(fields): JsonBody<ContactFields>,
) -> Result<impl IntoResponse, Error>
where
  S: Backend,
  M: Transport,
{
  fields.validate()?;
  let contact = state
    .store
    .create_contact(user.user_id, fields)
    .await
    .map_err(Error::store)?;
  tracing::info!(contact_id = contact.contact_id, user_id = user.user_id, "contact created");
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /api/contacts/stats`
pub async fn stats<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
) -> Result<Json<ContactStats>, Error>
where
  S: Backend,
  M: Transport,
{
  let stats = state.store.contact_stats(user.user_id).await.map_err(Error::store)?;
  Ok(Json(stats))
}

// ─── Single contact ───────────────────────────────────────────────────────────

/// `GET /api/contacts/{id}`
pub async fn get_one<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  PathParam(id): PathParam<ContactId>,
) -> Result<Json<Contact>, Error>
where
  S: Backend,
  M: Transport,
{
  Ok(Json(owned_contact(&*state.store, &user, id).await?))
}

/// `PUT /api/contacts/{id}`
pub async fn update<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  PathParam(id): PathParam<ContactId>,
  JsonBody(fields): JsonBody<ContactFields>,
) -> Result<Json<Contact>, Error>
where
  S: Backend,
  M: Transport,
{
  fields.validate()?;
  let mut contact = owned_contact(&*state.store, &user, id).await?;
  contact.apply(fields);
  let saved = state.store.save_contact(&contact).await.map_err(Error::store)?;
  Ok(Json(saved))
}

/// `DELETE /api/contacts/{id}`
pub async fn delete<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  PathParam(id): PathParam<ContactId>,
) -> Result<StatusCode, Error>
where
  S: Backend,
  M: Transport,
{
  owned_contact(&*state.store, &user, id).await?;
  state.store.delete_contact(id).await.map_err(Error::store)?;
  tracing::info!(contact_id = id, user_id = user.user_id, "contact deleted");
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/contacts/{id}/logs`
pub async fn logs<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  PathParam(id): PathParam<ContactId>,
) -> Result<Json<Vec<SendLogRecord>>, Error>
where
  S: Backend,
  M: Transport,
{
  owned_contact(&*state.store, &user, id).await?;
  let records = state.store.logs_for_contact(id).await.map_err(Error::store)?;
  Ok(Json(records))
}
