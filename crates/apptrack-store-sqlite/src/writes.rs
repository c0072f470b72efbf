//! Transactional writes, run on the connection thread.
//!
//! Each application write opens one `IMMEDIATE` transaction, applies the
//! change, calls [`refresh_student`], and commits. Returning early on any
//! error drops the transaction, which rolls it back, so an application change
//! is never visible without its matching student status.

use apptrack_core::{
  Error as CoreError,
  application::{Application, ApplicationPatch, ApplicationWrite, NewApplication},
  resolver::resolve,
  student::{
    NewStudent, RecomputeFailure, RecomputeReport, StatusChange, Student, StudentPatch,
    StudentStatus,
  },
};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, Transaction, TransactionBehavior};
use uuid::Uuid;

use crate::{
  Result,
  encode::{decode_status, encode_dt, encode_status, encode_uuid},
  reads,
};

fn begin(conn: &mut Connection) -> Result<Transaction<'_>> {
  Ok(conn.transaction_with_behavior(TransactionBehavior::Immediate)?)
}

// ─── Recompute ───────────────────────────────────────────────────────────────

/// Re-run the resolver over every application of `student_id` and write the
/// result onto the student row.
///
/// This is the only code path that writes `highest_status`/`highest_intake`.
/// Takes a [`Transaction`] so it cannot run outside of one.
pub fn refresh_student(
  tx: &Transaction<'_>,
  student_id: Uuid,
  now: DateTime<Utc>,
) -> Result<StatusChange> {
  let id_str = encode_uuid(student_id);

  let stored: Option<(Option<String>, Option<String>)> = tx
    .query_row(
      "SELECT highest_status, highest_intake FROM students WHERE student_id = ?1",
      rusqlite::params![id_str],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?;
  let Some((status_str, highest_intake)) = stored else {
    return Err(CoreError::StudentNotFound(student_id).into());
  };
  let before = StudentStatus {
    student_id,
    highest_status: status_str.as_deref().map(decode_status).transpose()?,
    highest_intake,
  };

  let applications = reads::applications_of(tx, student_id)?;
  let highest = resolve(&applications)?;
  let after = StudentStatus::from_resolution(student_id, highest.as_ref());

  if after != before {
    tx.execute(
      "UPDATE students SET highest_status = ?2, highest_intake = ?3, updated_at = ?4
       WHERE student_id = ?1",
      rusqlite::params![
        id_str,
        after.highest_status.map(encode_status),
        after.highest_intake,
        encode_dt(now),
      ],
    )?;
    tracing::info!(
      %student_id,
      applications = applications.len(),
      from = ?before.highest_status,
      to = ?after.highest_status,
      intake = ?after.highest_intake,
      "student status recomputed",
    );
  } else {
    tracing::debug!(%student_id, applications = applications.len(), "student status unchanged");
  }

  Ok(StatusChange { before, after })
}

// ─── Students ────────────────────────────────────────────────────────────────

fn ensure_email_free(tx: &Transaction<'_>, email: &str, except: Option<Uuid>) -> Result<()> {
  let taken: Option<String> = tx
    .query_row(
      "SELECT student_id FROM students
       WHERE lower(email) = lower(?1) AND deleted_at IS NULL
         AND (?2 IS NULL OR student_id != ?2)",
      rusqlite::params![email, except.map(encode_uuid)],
      |row| row.get(0),
    )
    .optional()?;
  match taken {
    Some(_) => Err(CoreError::DuplicateEmail(email.to_owned()).into()),
    None => Ok(()),
  }
}

pub fn insert_student(conn: &mut Connection, input: &NewStudent, now: DateTime<Utc>) -> Result<Student> {
  let tx = begin(conn)?;
  ensure_email_free(&tx, input.email(), None)?;

  let student = Student {
    id:             Uuid::new_v4(),
    name:           input.name().to_owned(),
    email:          input.email().to_owned(),
    phone:          input.phone().to_owned(),
    highest_status: None,
    highest_intake: None,
    created_at:     now,
    updated_at:     now,
    deleted_at:     None,
  };

  tx.execute(
    "INSERT INTO students (student_id, name, email, phone, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    rusqlite::params![
      encode_uuid(student.id),
      student.name,
      student.email,
      student.phone,
      encode_dt(now),
    ],
  )?;
  tx.commit()?;

  tracing::info!(student_id = %student.id, "student created");
  Ok(student)
}

pub fn update_student(
  conn: &mut Connection,
  id: Uuid,
  patch: &StudentPatch,
  now: DateTime<Utc>,
) -> Result<Student> {
  let tx = begin(conn)?;
  let Some(mut student) = reads::fetch_student(&tx, id)? else {
    return Err(CoreError::StudentNotFound(id).into());
  };
  if patch.is_empty() {
    return Ok(student);
  }

  if let Some(email) = patch.email() {
    ensure_email_free(&tx, email, Some(id))?;
    email.clone_into(&mut student.email);
  }
  if let Some(name) = patch.name() {
    name.clone_into(&mut student.name);
  }
  if let Some(phone) = patch.phone() {
    phone.clone_into(&mut student.phone);
  }
  student.updated_at = now;

  tx.execute(
    "UPDATE students SET name = ?2, email = ?3, phone = ?4, updated_at = ?5
     WHERE student_id = ?1",
    rusqlite::params![
      encode_uuid(id),
      student.name,
      student.email,
      student.phone,
      encode_dt(now),
    ],
  )?;
  tx.commit()?;
  Ok(student)
}

pub fn soft_delete_student(conn: &Connection, id: Uuid, now: DateTime<Utc>) -> Result<()> {
  let at = encode_dt(now);
  let changed = conn.execute(
    "UPDATE students SET deleted_at = ?2, updated_at = ?2
     WHERE student_id = ?1 AND deleted_at IS NULL",
    rusqlite::params![encode_uuid(id), at],
  )?;
  if changed == 0 {
    return Err(CoreError::StudentNotFound(id).into());
  }
  tracing::info!(student_id = %id, "student soft-deleted");
  Ok(())
}

// ─── Applications ────────────────────────────────────────────────────────────

pub fn insert_application(
  conn: &mut Connection,
  input: &NewApplication,
  now: DateTime<Utc>,
) -> Result<ApplicationWrite> {
  let tx = begin(conn)?;
  if reads::fetch_student(&tx, input.student_id())?.is_none() {
    tracing::warn!(student_id = %input.student_id(), "application rejected: unknown student");
    return Err(CoreError::UnknownStudent(input.student_id()).into());
  }

  let application = Application {
    id:              Uuid::new_v4(),
    student_id:      input.student_id(),
    university_name: input.university_name().to_owned(),
    program_name:    input.program_name().to_owned(),
    intake:          input.intake().to_string(),
    status:          input.status(),
    created_at:      now,
    updated_at:      now,
  };

  tx.execute(
    "INSERT INTO applications (
       application_id, student_id, university_name, program_name,
       intake, status, created_at, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    rusqlite::params![
      encode_uuid(application.id),
      encode_uuid(application.student_id),
      application.university_name,
      application.program_name,
      application.intake,
      encode_status(application.status),
      encode_dt(now),
    ],
  )?;

  let change = refresh_student(&tx, application.student_id, now)?;
  tx.commit()?;

  Ok(ApplicationWrite { application, student_status: change.after })
}

pub fn update_application(
  conn: &mut Connection,
  id: Uuid,
  patch: &ApplicationPatch,
  now: DateTime<Utc>,
) -> Result<ApplicationWrite> {
  let tx = begin(conn)?;
  let Some(mut application) = reads::fetch_application(&tx, id)? else {
    return Err(CoreError::ApplicationNotFound(id).into());
  };

  if let Some(university) = patch.university_name() {
    university.clone_into(&mut application.university_name);
  }
  if let Some(program) = patch.program_name() {
    program.clone_into(&mut application.program_name);
  }
  if let Some(intake) = patch.intake() {
    application.intake = intake.to_string();
  }
  if let Some(status) = patch.status() {
    application.status = status;
  }
  application.updated_at = now;

  tx.execute(
    "UPDATE applications
     SET university_name = ?2, program_name = ?3, intake = ?4, status = ?5, updated_at = ?6
     WHERE application_id = ?1",
    rusqlite::params![
      encode_uuid(id),
      application.university_name,
      application.program_name,
      application.intake,
      encode_status(application.status),
      encode_dt(now),
    ],
  )?;

  let change = refresh_student(&tx, application.student_id, now)?;
  tx.commit()?;

  Ok(ApplicationWrite { application, student_status: change.after })
}

pub fn delete_application(conn: &mut Connection, id: Uuid, now: DateTime<Utc>) -> Result<StudentStatus> {
  let tx = begin(conn)?;
  let Some(application) = reads::fetch_application(&tx, id)? else {
    return Err(CoreError::ApplicationNotFound(id).into());
  };

  tx.execute(
    "DELETE FROM applications WHERE application_id = ?1",
    rusqlite::params![encode_uuid(id)],
  )?;

  let change = refresh_student(&tx, application.student_id, now)?;
  tx.commit()?;

  tracing::info!(application_id = %id, student_id = %application.student_id, "application deleted");
  Ok(change.after)
}

// ─── Maintenance ─────────────────────────────────────────────────────────────

pub fn recompute_student(conn: &mut Connection, id: Uuid, now: DateTime<Utc>) -> Result<StatusChange> {
  let tx = begin(conn)?;
  if reads::fetch_student(&tx, id)?.is_none() {
    return Err(CoreError::StudentNotFound(id).into());
  }
  let change = refresh_student(&tx, id, now)?;
  tx.commit()?;
  Ok(change)
}

pub fn recompute_all(conn: &mut Connection, now: DateTime<Utc>) -> Result<RecomputeReport> {
  let ids = reads::live_student_ids(conn)?;

  let mut report = RecomputeReport { students: ids.len(), ..RecomputeReport::default() };
  for id in ids {
    let outcome = begin(conn).and_then(|tx| {
      let change = refresh_student(&tx, id, now)?;
      tx.commit()?;
      Ok(change)
    });
    match outcome {
      Ok(change) if change.changed() => report.changed.push(change),
      Ok(_) => {}
      Err(e) => {
        tracing::warn!(student_id = %id, error = %e, "recompute failed for student");
        report.failed.push(RecomputeFailure { student_id: id, error: e.to_string() });
      }
    }
  }

  tracing::info!(
    students = report.students,
    changed = report.changed.len(),
    failed = report.failed.len(),
    "recomputed all student statuses",
  );
  Ok(report)
}
