//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are fixed-width RFC 3339 UTC strings so that they sort
//! lexically. UUIDs are hyphenated lowercase strings. Statuses are stored as
//! their display labels.

use apptrack_core::{application::Application, status::ApplicationStatus, student::Student};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ApplicationStatus ────────────────────────────────────────────────────────

pub fn encode_status(status: ApplicationStatus) -> &'static str { status.as_str() }

pub fn decode_status(s: &str) -> Result<ApplicationStatus> {
  Ok(ApplicationStatus::parse(s)?)
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// Column list matching [`RawStudent::from_row`].
pub const STUDENT_COLUMNS: &str = "student_id, name, email, phone, highest_status, \
   highest_intake, created_at, updated_at, deleted_at";

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id:     String,
  pub name:           String,
  pub email:          String,
  pub phone:          String,
  pub highest_status: Option<String>,
  pub highest_intake: Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
  pub deleted_at:     Option<String>,
}

impl RawStudent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:     row.get(0)?,
      name:           row.get(1)?,
      email:          row.get(2)?,
      phone:          row.get(3)?,
      highest_status: row.get(4)?,
      highest_intake: row.get(5)?,
      created_at:     row.get(6)?,
      updated_at:     row.get(7)?,
      deleted_at:     row.get(8)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:             decode_uuid(&self.student_id)?,
      name:           self.name,
      email:          self.email,
      phone:          self.phone,
      highest_status: self.highest_status.as_deref().map(decode_status).transpose()?,
      highest_intake: self.highest_intake,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
      deleted_at:     self.deleted_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}

/// Column list matching [`RawApplication::from_row`].
pub const APPLICATION_COLUMNS: &str = "application_id, student_id, university_name, \
   program_name, intake, status, created_at, updated_at";

/// Raw strings read directly from an `applications` row.
pub struct RawApplication {
  pub application_id:  String,
  pub student_id:      String,
  pub university_name: String,
  pub program_name:    String,
  pub intake:          String,
  pub status:          String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawApplication {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      application_id:  row.get(0)?,
      student_id:      row.get(1)?,
      university_name: row.get(2)?,
      program_name:    row.get(3)?,
      intake:          row.get(4)?,
      status:          row.get(5)?,
      created_at:      row.get(6)?,
      updated_at:      row.get(7)?,
    })
  }

  pub fn into_application(self) -> Result<Application> {
    Ok(Application {
      id:              decode_uuid(&self.application_id)?,
      student_id:      decode_uuid(&self.student_id)?,
      university_name: self.university_name,
      program_name:    self.program_name,
      intake:          self.intake,
      status:          decode_status(&self.status)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_roundtrip() {
    let now = Utc::now();
    let encoded = encode_dt(now);
    assert!(encoded.ends_with('Z'));
    assert_eq!(encoded.len(), "2026-01-01T00:00:00.000000Z".len());
    let back = decode_dt(&encoded).unwrap();
    assert_eq!(back.timestamp_micros(), now.timestamp_micros());
  }

  #[test]
  fn unknown_status_label_fails_to_decode() {
    assert!(decode_status("Accepted").is_err());
    assert_eq!(decode_status("Dropped").unwrap(), ApplicationStatus::Dropped);
  }
}
