//! Handlers for `/api/resume`.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, Backend, Transport,
  auth::AuthUser,
  error::Error,
  extract::MultipartBody,
  resume::display_name,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeInfo {
  pub has_resume: bool,
  pub file_name:  Option<String>,
}

/// `GET /api/resume`
pub async fn info<S, M>(AuthUser(user): AuthUser) -> Json<ResumeInfo>
where
  S: Backend,
  M: Transport,
{
  let has_resume = user.has_resume();
  Json(ResumeInfo {
    has_resume,
    file_name: user.resume_original_name.filter(|_| has_resume),
  })
}

/// `POST /api/resume` with a multipart `file` field.
///
/// The new file is stored and recorded before the old one is removed, so a
/// failed upload leaves the previous resume in place.
pub async fn upload<S, M>(
  State(state): State<AppState<S, M>>,
  AuthUser(user): AuthUser,
  MultipartBody(mut multipart): MultipartBody,
) -> Result<Json<ResumeInfo>, Error>
where
  S: Backend,
  M: Transport,
{
  let mut upload = None;
  while let Some(field) = multipart.next_field().await? {
    if field.name() == Some("file") {
      let name = field.file_name().unwrap_or_default().to_owned();
      let content = field.bytes().await?;
      upload = Some((name, content));
      break;
    }
  }
  let (original_name, content) =
    upload.ok_or_else(|| Error::BadRequest("Missing multipart field `file`".to_owned()))?;

  let path = state.resumes.store(&original_name, &content).await?;
  let name = display_name(&original_name).to_owned();

  let updated = match state.store.set_resume(user.user_id, path.clone(), name).await {
    Ok(Some(u)) => u,
    Ok(None) => {
      state.resumes.delete(&path).await;
      return Err(Error::Unauthorized("account no longer exists"));
    }
    Err(e) => {
      state.resumes.delete(&path).await;
      return Err(Error::store(e));
    }
  };

  if let Some(old) = user.resume_path.as_deref().filter(|p| *p != path) {
    state.resumes.delete(old).await;
  }

  tracing::info!(user_id = updated.user_id, "resume replaced");
  Ok(Json(ResumeInfo {
    has_resume: updated.has_resume(),
    file_name:  updated.resume_original_name,
  }))
}
