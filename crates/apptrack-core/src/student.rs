//! Students: contact details plus the two derived status fields.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, resolver::HighestStatus, status::ApplicationStatus};

// ─── Student ─────────────────────────────────────────────────────────────────

/// A persisted student.
///
/// `highest_status` and `highest_intake` are derived from the student's
/// applications and only ever written by the store's recompute step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:             Uuid,
  pub name:           String,
  pub email:          String,
  pub phone:          String,
  pub highest_status: Option<ApplicationStatus>,
  pub highest_intake: Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
  /// Set when the student is soft-deleted.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deleted_at:     Option<DateTime<Utc>>,
}

impl Student {
  pub fn status(&self) -> StudentStatus {
    StudentStatus {
      student_id:     self.id,
      highest_status: self.highest_status,
      highest_intake: self.highest_intake.clone(),
    }
  }
}

// ─── Status read model ───────────────────────────────────────────────────────

/// The derived fields of one student, as reported by the status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentStatus {
  pub student_id:     Uuid,
  pub highest_status: Option<ApplicationStatus>,
  pub highest_intake: Option<String>,
}

impl StudentStatus {
  pub fn from_resolution(student_id: Uuid, highest: Option<&HighestStatus>) -> Self {
    Self {
      student_id,
      highest_status: highest.map(|h| h.status),
      highest_intake: highest.map(|h| h.intake.to_string()),
    }
  }
}

/// Before/after view of a single recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
  pub before: StudentStatus,
  pub after:  StudentStatus,
}

impl StatusChange {
  pub fn changed(&self) -> bool { self.before != self.after }
}

/// Outcome of recomputing every student.
///
/// Each student is recomputed on its own, so one bad row only lands that
/// student in `failed`; everyone else is still repaired.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecomputeReport {
  pub students: usize,
  pub changed:  Vec<StatusChange>,
  pub failed:   Vec<RecomputeFailure>,
}

/// A student whose derived fields could not be recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeFailure {
  pub student_id: Uuid,
  pub error:      String,
}

// ─── Input ───────────────────────────────────────────────────────────────────

/// Validated input to [`crate::store::ApplicationStore::add_student`].
#[derive(Debug, Clone)]
pub struct NewStudent {
  name:  String,
  email: String,
  phone: String,
}

impl NewStudent {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    phone: impl Into<String>,
  ) -> Result<Self> {
    Ok(Self {
      name:  required("name", name.into())?,
      email: email_address(email.into())?,
      phone: required("phone", phone.into())?,
    })
  }

  pub fn name(&self) -> &str { &self.name }

  pub fn email(&self) -> &str { &self.email }

  pub fn phone(&self) -> &str { &self.phone }
}

/// A partial update of a student's contact fields. Derived fields are not
/// patchable.
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
  name:  Option<String>,
  email: Option<String>,
  phone: Option<String>,
}

impl StudentPatch {
  pub fn new(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
  ) -> Result<Self> {
    Ok(Self {
      name:  name.map(|n| required("name", n)).transpose()?,
      email: email.map(email_address).transpose()?,
      phone: phone.map(|p| required("phone", p)).transpose()?,
    })
  }

  pub fn name(&self) -> Option<&str> { self.name.as_deref() }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone(&self) -> Option<&str> { self.phone.as_deref() }

  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.email.is_none() && self.phone.is_none()
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::ApplicationStore::list_students`].
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
  /// Only students whose derived `highest_status` equals this.
  pub status: Option<ApplicationStatus>,
  /// Case-insensitive substring over name and email.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Validation ──────────────────────────────────────────────────────────────

pub(crate) fn required(field: &'static str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(field, "must not be empty"));
  }
  Ok(trimmed.to_owned())
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
    .expect("email pattern is valid")
});

/// Returns the trimmed address if it has valid email syntax.
pub fn email_address(value: String) -> Result<String> {
  let value = required("email", value)?;
  if !EMAIL.is_match(&value) {
    return Err(Error::validation("email", format!("{value:?} is not a valid email address")));
  }
  Ok(value)
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case("alice@example.com")]
  #[case("a.b+tag@uni.ac.uk")]
  #[case(" bob_99@mail-host.io ")]
  fn accepts_valid_emails(#[case] email: &str) {
    assert!(email_address(email.to_owned()).is_ok());
  }

  #[rstest]
  #[case("")]
  #[case("alice")]
  #[case("alice@")]
  #[case("@example.com")]
  #[case("alice@example")]
  #[case("al ice@example.com")]
  fn rejects_invalid_emails(#[case] email: &str) {
    let err = email_address(email.to_owned()).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "email", .. }));
  }

  #[test]
  fn new_student_trims_and_requires_fields() {
    let s = NewStudent::new("  Ada ", "ada@example.com", "+44 20 7946 0000").unwrap();
    assert_eq!(s.name(), "Ada");

    let err = NewStudent::new("Ada", "ada@example.com", "   ").unwrap_err();
    assert!(matches!(err, Error::Validation { field: "phone", .. }));
  }

  #[test]
  fn patch_validates_only_present_fields() {
    let patch = StudentPatch::new(None, Some("new@example.com".into()), None).unwrap();
    assert_eq!(patch.email(), Some("new@example.com"));
    assert!(!patch.is_empty());

    assert!(StudentPatch::new(Some(String::new()), None, None).is_err());
    assert!(StudentPatch::default().is_empty());
  }
}
