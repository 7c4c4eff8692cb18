//! outreach server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), layers
//! `OUTREACH_*` environment variables on top, opens the SQLite store and
//! serves the JSON API over HTTP.
//!
//! Nested keys use a double underscore, e.g. `OUTREACH_SMTP__HOST`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use outreach_mail::Mailer;
use outreach_server::{AppState, ServerConfig, auth::TokenService, resume::ResumeStorage};
use outreach_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Outreach API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("OUTREACH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.jwt_secret.len() < 32 {
    tracing::warn!("jwt_secret is shorter than 32 bytes");
  }

  let database_path = expand_tilde(&server_cfg.database_path);
  if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&database_path)
    .await
    .with_context(|| format!("failed to open store at {database_path:?}"))?;

  let upload_dir = expand_tilde(&server_cfg.upload_dir);
  let resumes = ResumeStorage::new(&upload_dir)
    .with_context(|| format!("failed to prepare upload dir {upload_dir:?}"))?;

  let mailer = Mailer::from_config(server_cfg.smtp.as_ref())
    .context("failed to configure SMTP transport")?;

  let state = AppState {
    store:   Arc::new(store),
    mailer:  Arc::new(mailer),
    resumes: Arc::new(resumes),
    tokens:  Arc::new(TokenService::new(
      &server_cfg.jwt_secret,
      server_cfg.jwt_expiry_seconds,
    )),
    config:  Arc::new(server_cfg.clone()),
  };

  let app = outreach_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
