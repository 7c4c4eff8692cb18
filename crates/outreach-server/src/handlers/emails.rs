//! Handler for `POST /api/emails/send`.

use axum::{Json, extract::State};
use outreach_core::dispatch::{DispatchRequest, DispatchResult, Dispatcher};

use crate::{AppState, Backend, Transport, auth::AuthUser, error::Error, extract::JsonBody};

/// Send one message per requested contact. Per-contact failures are
/// reported in the body; only an invalid request or a missing resume fail
/// the call.
pub async fn send<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  JsonBody(request): JsonBody<DispatchRequest>,
) -> Result<Json<DispatchResult>, Error>
where
  S: Backend,
  M: Transport,
{
  let store = &*state.store;
  let result = Dispatcher::new(store, store, &*state.mailer, &*state.resumes)
    .dispatch(&user, &request)
    .await?;
  Ok(Json(result))
}
