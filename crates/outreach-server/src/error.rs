//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  extract::{
    multipart::{MultipartError, MultipartRejection},
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use outreach_core::dispatch::DispatchError;
use serde_json::json;
use thiserror::Error;

use crate::resume::ResumeError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized: {0}")]
  Unauthorized(&'static str),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Store(Box::new(e))
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Unauthorized(m) => (StatusCode::UNAUTHORIZED, (*m).to_owned()),
      Error::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      Error::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      Error::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      Error::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
    };

    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

impl From<outreach_core::Error> for Error {
  fn from(e: outreach_core::Error) -> Self { Error::BadRequest(e.to_string()) }
}

impl From<DispatchError> for Error {
  fn from(e: DispatchError) -> Self { Error::BadRequest(e.to_string()) }
}

impl From<MultipartError> for Error {
  fn from(e: MultipartError) -> Self { Error::BadRequest(e.body_text()) }
}

impl From<JsonRejection> for Error {
  fn from(e: JsonRejection) -> Self { Error::BadRequest(e.body_text()) }
}

impl From<QueryRejection> for Error {
  fn from(e: QueryRejection) -> Self { Error::BadRequest(e.body_text()) }
}

impl From<PathRejection> for Error {
  fn from(e: PathRejection) -> Self { Error::BadRequest(e.body_text()) }
}

impl From<MultipartRejection> for Error {
  fn from(e: MultipartRejection) -> Self { Error::BadRequest(e.body_text()) }
}

impl From<ResumeError> for Error {
  fn from(e: ResumeError) -> Self {
    match e {
      ResumeError::Io(io) => Error::Internal(format!("failed to store file: {io}")),
      other => Error::BadRequest(other.to_string()),
    }
  }
}
