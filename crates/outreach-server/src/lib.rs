//! HTTP API for Outreach.
//!
//! Exposes an axum [`Router`] over any store implementing the
//! `outreach-core` storage traits and any [`MailTransport`]. Every route
//! except signup and login requires a bearer token; the caller is resolved
//! per request by the [`auth::AuthUser`] extractor.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod resume;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use outreach_core::{
  store::{ContactStore, SendLogStore, UserStore},
  transport::MailTransport,
};
use outreach_mail::SmtpConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::TokenService;
use handlers::{auth as auth_routes, contacts, emails, resume as resume_routes};
use resume::ResumeStorage;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `OUTREACH_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub database_path:      PathBuf,
  pub upload_dir:         PathBuf,
  pub jwt_secret:         String,
  #[serde(default = "default_jwt_expiry")]
  pub jwt_expiry_seconds: u64,
  #[serde(default = "default_max_upload")]
  pub max_upload_bytes:   usize,
  /// Without this section mail is only logged.
  #[serde(default)]
  pub smtp:               Option<SmtpConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_jwt_expiry() -> u64 { 24 * 60 * 60 }

fn default_max_upload() -> usize { 10 * 1024 * 1024 }

// ─── Application state ────────────────────────────────────────────────────────

/// Everything a backing store must provide.
pub trait Backend: ContactStore + SendLogStore + UserStore + Clone + 'static {}

impl<T> Backend for T where T: ContactStore + SendLogStore + UserStore + Clone + 'static {}

/// A mail transport usable from shared state.
pub trait Transport: MailTransport + Clone + 'static {}

impl<T> Transport for T where T: MailTransport + Clone + 'static {}

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, M> {
  pub store:   Arc<S>,
  pub mailer:  Arc<M>,
  pub resumes: Arc<ResumeStorage>,
  pub tokens:  Arc<TokenService>,
  pub config:  Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the API.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: Backend,
  M: Transport,
{
  let body_limit = state.config.max_upload_bytes;
  Router::new()
    .route("/api/auth/signup",        post(auth_routes::signup::<S, M>))
    .route("/api/auth/login",         post(auth_routes::login::<S, M>))
    .route("/api/contacts",           get(contacts::list::<S, M>).post(contacts::create::<S, M>))
    .route("/api/contacts/stats",     get(contacts::stats::<S, M>))
    .route(
      "/api/contacts/{id}",
      get(contacts::get_one::<S, M>)
        .put(contacts::update::<S, M>)
        .delete(contacts::delete::<S, M>),
    )
    .route("/api/contacts/{id}/logs", get(contacts::logs::<S, M>))
    .route("/api/resume",             get(resume_routes::info::<S, M>).post(resume_routes::upload::<S, M>))
    .route("/api/emails/send",        post(emails::send::<S, M>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
