//! University applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  intake::Intake,
  status::ApplicationStatus,
  student::{StudentStatus, required},
};

// ─── Application ─────────────────────────────────────────────────────────────

/// A persisted application.
///
/// `intake` holds the stored label verbatim. Writes always store the
/// canonical form of a parsed [`Intake`]; the resolver re-parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
  pub id:              Uuid,
  pub student_id:      Uuid,
  pub university_name: String,
  pub program_name:    String,
  pub intake:          String,
  pub status:          ApplicationStatus,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// An application write together with the owning student's derived fields
/// as recomputed in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWrite {
  pub application:    Application,
  pub student_status: StudentStatus,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::ApplicationStore::add_application`].
#[derive(Debug, Clone)]
pub struct NewApplication {
  student_id:      Uuid,
  university_name: String,
  program_name:    String,
  intake:          Intake,
  status:          ApplicationStatus,
}

impl NewApplication {
  pub fn new(
    student_id: Uuid,
    university_name: impl Into<String>,
    program_name: impl Into<String>,
    intake: Intake,
    status: ApplicationStatus,
  ) -> Result<Self> {
    Ok(Self {
      student_id,
      university_name: required("university_name", university_name.into())?,
      program_name: required("program_name", program_name.into())?,
      intake,
      status,
    })
  }

  pub fn student_id(&self) -> Uuid { self.student_id }

  pub fn university_name(&self) -> &str { &self.university_name }

  pub fn program_name(&self) -> &str { &self.program_name }

  pub fn intake(&self) -> Intake { self.intake }

  pub fn status(&self) -> ApplicationStatus { self.status }
}

/// A partial update. `student_id` cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
  university_name: Option<String>,
  program_name:    Option<String>,
  intake:          Option<Intake>,
  status:          Option<ApplicationStatus>,
}

impl ApplicationPatch {
  pub fn new(
    university_name: Option<String>,
    program_name: Option<String>,
    intake: Option<Intake>,
    status: Option<ApplicationStatus>,
  ) -> Result<Self> {
    Ok(Self {
      university_name: university_name
        .map(|u| required("university_name", u))
        .transpose()?,
      program_name: program_name.map(|p| required("program_name", p)).transpose()?,
      intake,
      status,
    })
  }

  /// A patch that only moves the application to `status`.
  pub fn with_status(status: ApplicationStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }

  /// A patch that only changes the intake.
  pub fn with_intake(intake: Intake) -> Self {
    Self { intake: Some(intake), ..Self::default() }
  }

  pub fn university_name(&self) -> Option<&str> { self.university_name.as_deref() }

  pub fn program_name(&self) -> Option<&str> { self.program_name.as_deref() }

  pub fn intake(&self) -> Option<Intake> { self.intake }

  pub fn status(&self) -> Option<ApplicationStatus> { self.status }

  pub fn is_empty(&self) -> bool {
    self.university_name.is_none()
      && self.program_name.is_none()
      && self.intake.is_none()
      && self.status.is_none()
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ApplicationStore::list_applications`].
#[derive(Debug, Clone, Default)]
pub struct ApplicationQuery {
  pub student_id: Option<Uuid>,
  pub status:     Option<ApplicationStatus>,
  /// Case-insensitive substring over university and program names.
  pub search:     Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}
