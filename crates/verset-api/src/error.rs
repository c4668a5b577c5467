//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the server as `{"success": false, "error": message}`
//! with the matching status code; no request is allowed to crash the
//! process.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use verset_core::assign::AssignError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  NotFound(String),

  #[error("no verses available; ask the administrator to add some")]
  EmptyPool,

  #[error("unauthorized")]
  Unauthorized,

  /// Bad admin credentials. One message for both a wrong username and a
  /// wrong password.
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn from_assign<E>(err: AssignError<E>) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match err {
      AssignError::InvalidEmail(raw) => {
        Self::Validation(format!("invalid email address: {raw}"))
      }
      AssignError::EmptyPool => Self::EmptyPool,
      AssignError::Store(e) => Self::Store(Box::new(e)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Validation(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
      ApiError::Unauthorized | ApiError::InvalidCredentials => {
        StatusCode::UNAUTHORIZED
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error while handling request");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let body = json!({ "success": false, "error": self.to_string() });
    (status, Json(body)).into_response()
  }
}
