//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// `Parse` and `Validation` are client errors, `NotFound` is a 404, and
/// `Persistence` is a 500.
impl From<rota_core::Error> for ApiError {
  fn from(e: rota_core::Error) -> Self {
    match e {
      rota_core::Error::Parse(m) => Self::BadRequest(m),
      rota_core::Error::Validation(m) => Self::BadRequest(m),
      rota_core::Error::NotFound(m) => Self::NotFound(m),
      err @ rota_core::Error::Persistence(_) => Self::Store(Box::new(err)),
    }
  }
}

/// Undecodable or unnormalizable spreadsheets are always the client's
/// problem.
impl From<rota_sheet::Error> for ApiError {
  fn from(e: rota_sheet::Error) -> Self {
    Self::BadRequest(e.to_string())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
