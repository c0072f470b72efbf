//! Error types for `apptrack-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("application not found: {0}")]
  ApplicationNotFound(Uuid),

  /// An application referenced a student that does not exist (or is deleted).
  #[error("unknown student: {0}")]
  UnknownStudent(Uuid),

  #[error("a student with email {0:?} already exists")]
  DuplicateEmail(String),

  #[error("{field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  #[error("intake: {0:?} is not a valid intake (expected e.g. \"Jan 2026\")")]
  InvalidIntake(String),

  #[error("status: unknown application status {0:?}")]
  UnknownStatus(String),

  /// A stored application carries an intake the resolver cannot order.
  #[error("application {application_id} has malformed intake {intake:?}")]
  MalformedIntake {
    application_id: Uuid,
    intake:         String,
  },

  /// The write could not be serialised against a concurrent writer.
  #[error("transient storage failure: {0}")]
  Transient(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
