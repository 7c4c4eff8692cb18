//! On-disk resume storage.
//!
//! Uploaded files land in one directory under a random name that keeps the
//! original extension. The name the user uploaded under is kept on the user
//! row and used as the attachment's display name.

use std::{
  io,
  path::{Path, PathBuf},
};

use bytes::Bytes;
use outreach_core::{
  attachment::{Attachment, AttachmentProvider, AttachmentUnavailable, content_type_for},
  user::User,
};
use thiserror::Error;
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

#[derive(Debug, Error)]
pub enum ResumeError {
  #[error("Please select a file to upload")]
  EmptyName,

  #[error("Only PDF, DOC, and DOCX files are allowed")]
  UnsupportedType,

  #[error("The uploaded file is empty")]
  EmptyFile,

  #[error(transparent)]
  Io(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct ResumeStorage {
  dir: PathBuf,
}

impl ResumeStorage {
  /// Use `dir` for uploads, creating it if needed.
  pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
    std::fs::create_dir_all(dir.as_ref())?;
    let dir = std::fs::canonicalize(dir.as_ref())?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  /// Write an upload and return its absolute stored path.
  pub async fn store(&self, original_name: &str, content: &[u8]) -> Result<String, ResumeError> {
    let name = display_name(original_name);
    if name.is_empty() {
      return Err(ResumeError::EmptyName);
    }
    let ext = allowed_extension(name).ok_or(ResumeError::UnsupportedType)?;
    if content.is_empty() {
      return Err(ResumeError::EmptyFile);
    }

    let path = self.dir.join(format!("{}.{ext}", Uuid::new_v4()));
    tokio::fs::write(&path, content).await?;
    tracing::info!(path = %path.display(), bytes = content.len(), "stored resume");
    Ok(path.to_string_lossy().into_owned())
  }

  /// Remove a previously stored file. Failures are logged, never returned.
  pub async fn delete(&self, path: &str) {
    let path = Path::new(path);
    if !path.starts_with(&self.dir) {
      tracing::warn!(path = %path.display(), "refusing to delete file outside upload dir");
      return;
    }
    match tokio::fs::remove_file(path).await {
      Ok(()) => tracing::debug!(path = %path.display(), "deleted old resume"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to delete old resume"),
    }
  }
}

/// Strip any client-supplied directory components from an upload name.
pub fn display_name(original_name: &str) -> &str {
  original_name
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or_default()
    .trim()
}

fn allowed_extension(name: &str) -> Option<String> {
  let (_, ext) = name.rsplit_once('.')?;
  let ext = ext.to_ascii_lowercase();
  ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

impl AttachmentProvider for ResumeStorage {
  async fn resolve(&self, user: &User) -> Result<Attachment, AttachmentUnavailable> {
    let stored = match user.resume_path.as_deref() {
      Some(p) if !p.trim().is_empty() => p,
      _ => return Err(AttachmentUnavailable::NotConfigured),
    };
    let path = Path::new(stored);

    let content = match tokio::fs::read(path).await {
      Ok(bytes) => bytes,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(AttachmentUnavailable::Missing { path: stored.to_owned() });
      }
      Err(e) => return Err(AttachmentUnavailable::Unreadable(e.to_string())),
    };

    let physical = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();
    let file_name = user
      .resume_original_name
      .as_deref()
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .map(str::to_owned)
      .unwrap_or_else(|| physical.clone());

    Ok(Attachment {
      content_type: content_type_for(&physical).to_owned(),
      file_name,
      content: Bytes::from(content),
    })
  }
}
