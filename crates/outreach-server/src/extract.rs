//! axum extractors whose rejections use the JSON error body.

use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};

use crate::error::Error;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);

pub struct MultipartBody(pub Multipart);

impl<S> FromRequest<S> for MultipartBody
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    Multipart::from_request(req, state).await.map(MultipartBody).map_err(Error::from)
  }
}
