//! API error type and [`axum::response::IntoResponse`] implementation.

use apptrack_core::{Error as CoreError, store::StoreError};
use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
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

  /// Well-formed request whose fields fail validation.
  #[error("validation failed: {0}")]
  Unprocessable(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// The store could not complete the write right now; safe to retry.
  #[error("temporarily unavailable: {0}")]
  Unavailable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend error by the domain error it carries, if any.
  pub fn from_store<E: StoreError>(e: E) -> Self {
    match e.as_core().and_then(classify) {
      Some(api) => api,
      None => {
        tracing::error!(error = %e, "store failure");
        Self::Store(Box::new(e))
      }
    }
  }

  /// Reject a request body that is missing required fields.
  pub fn missing(fields: &[(&'static str, bool)]) -> Result<(), Self> {
    if fields.iter().all(|(_, present)| *present) {
      Ok(())
    } else {
      Err(Self::missing_fields(fields))
    }
  }

  /// The validation error naming every field flagged as absent.
  pub fn missing_fields(fields: &[(&'static str, bool)]) -> Self {
    let missing: Vec<&str> = fields
      .iter()
      .filter(|(_, present)| !present)
      .map(|(name, _)| *name)
      .collect();
    Self::Unprocessable(format!("missing required fields: {}", missing.join(", ")))
  }
}

/// Map domain errors that describe the request rather than a fault.
fn classify(e: &CoreError) -> Option<ApiError> {
  let message = e.to_string();
  match e {
    CoreError::StudentNotFound(_)
    | CoreError::ApplicationNotFound(_)
    | CoreError::UnknownStudent(_) => Some(ApiError::NotFound(message)),
    CoreError::Validation { .. } | CoreError::InvalidIntake(_) | CoreError::UnknownStatus(_) => {
      Some(ApiError::Unprocessable(message))
    }
    CoreError::DuplicateEmail(_) => Some(ApiError::Conflict(message)),
    CoreError::Transient(_) => Some(ApiError::Unavailable(message)),
    CoreError::MalformedIntake { .. } | CoreError::Serialization(_) => None,
  }
}

impl From<CoreError> for ApiError {
  fn from(e: CoreError) -> Self {
    classify(&e).unwrap_or_else(|| ApiError::Store(Box::new(e)))
  }
}

// ─── Extractor rejections ─────────────────────────────────────────────────────

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      // Well-formed JSON that does not fit the body type.
      JsonRejection::JsonDataError(e) => Self::Unprocessable(e.body_text()),
      other => Self::BadRequest(other.body_text()),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unprocessable(m) => (StatusCode::UNPROCESSABLE_ENTITY, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;

  fn status_of(e: ApiError) -> StatusCode { e.into_response().status() }

  #[test]
  fn domain_errors_map_to_http_statuses() {
    let id = Uuid::new_v4();
    assert_eq!(status_of(CoreError::UnknownStudent(id).into()), StatusCode::NOT_FOUND);
    assert_eq!(
      status_of(CoreError::InvalidIntake("soon".into()).into()),
      StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
      status_of(CoreError::DuplicateEmail("a@b.co".into()).into()),
      StatusCode::CONFLICT
    );
    assert_eq!(
      status_of(CoreError::Transient("busy".into()).into()),
      StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
      status_of(
        CoreError::MalformedIntake { application_id: id, intake: "x".into() }.into()
      ),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn missing_fields_are_listed() {
    let err = ApiError::missing(&[("name", true), ("email", false), ("phone", false)])
      .unwrap_err();
    assert_eq!(err.to_string(), "validation failed: missing required fields: email, phone");
    assert!(ApiError::missing(&[("name", true)]).is_ok());
  }
}
