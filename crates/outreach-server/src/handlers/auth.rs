//! Handlers for `/api/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/auth/signup` | 201; 400 on invalid input or a taken email |
//! | `POST` | `/api/auth/login`  | 401 on bad credentials |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use outreach_core::user::{NewUser, User, validate_signup};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, Backend, Transport,
  auth::{hash_password, verify_login},
  error::Error,
  extract::JsonBody,
};

/// Returned by both signup and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
  pub token:      String,
  pub full_name:  String,
  pub email:      String,
  pub has_resume: bool,
}

impl AuthResponse {
  fn new(token: String, user: &User) -> Self {
    Self {
      token,
      full_name: user.full_name.clone(),
      email: user.email.clone(),
      has_resume: user.has_resume(),
    }
  }
}

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub full_name: String,
  pub email:     String,
  pub password:  String,
}

/// `POST /api/auth/signup`
pub async fn signup<S, M>(
  State(state): State<AppState<S, M>>,
  JsonBody(body): JsonBody<SignupBody>,
) -> Result<impl IntoResponse, Error>
where
  S: Backend,
  M: Transport,
{
  validate_signup(&body.full_name, &body.email, &body.password)?;

  let input = NewUser {
    full_name:     body.full_name.trim().to_owned(),
    email:         body.email.trim().to_owned(),
    password_hash: hash_password(&body.password)?,
  };
  let user = state
    .store
    .create_user(input)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::BadRequest("Email is already registered".to_owned()))?;

  tracing::info!(user_id = user.user_id, email = %user.email, "user registered");
  let token = state.tokens.issue(user.user_id)?;
  Ok((StatusCode::CREATED, Json(AuthResponse::new(token, &user))))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// `POST /api/auth/login`
pub async fn login<S, M>(
  State(state): State<AppState<S, M>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<AuthResponse>, Error>
where
  S: Backend,
  M: Transport,
{
  let user = state
    .store
    .find_user_by_email(body.email.trim())
    .await
    .map_err(Error::store)?;
  let verified = verify_login(&body.password, user.as_ref().map(|u| u.password_hash.as_str()));
  let user = user
    .filter(|_| verified)
    .ok_or(Error::Unauthorized("Invalid email or password"))?;

  let token = state.tokens.issue(user.user_id)?;
  Ok(Json(AuthResponse::new(token, &user)))
}
