//! Synchronous read queries, run on the connection thread.

use apptrack_core::{
  application::Application, statistics::ApplicationStatistics, student::Student,
};
use rusqlite::{Connection, OptionalExtension as _, functions::FunctionFlags};
use uuid::Uuid;

use crate::{
  Result,
  encode::{APPLICATION_COLUMNS, RawApplication, RawStudent, STUDENT_COLUMNS, encode_uuid},
};

/// Register `fold(text)`, a Unicode-aware lowercase used by search.
/// SQLite's own `lower()` and `LIKE` only fold ASCII.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "fold",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let text: Option<String> = ctx.get(0)?;
      Ok(text.map(|t| t.to_lowercase()))
    },
  )
}

/// A student by id. Soft-deleted rows are invisible.
pub fn fetch_student(conn: &Connection, id: Uuid) -> Result<Option<Student>> {
  let sql = format!(
    "SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1 AND deleted_at IS NULL"
  );
  let raw = conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawStudent::from_row)
    .optional()?;
  raw.map(RawStudent::into_student).transpose()
}

/// Owned, bindable form of a student listing query.
pub struct StudentFilter {
  pub status:  Option<&'static str>,
  /// Already folded and wrapped in `%…%`.
  pub pattern: Option<String>,
  pub limit:   i64,
  pub offset:  i64,
}

pub fn list_students(conn: &Connection, filter: &StudentFilter) -> Result<Vec<Student>> {
  let sql = format!(
    "SELECT {STUDENT_COLUMNS} FROM students
     WHERE deleted_at IS NULL
       AND (?1 IS NULL OR highest_status = ?1)
       AND (?2 IS NULL OR fold(name) LIKE ?2 OR fold(email) LIKE ?2)
     ORDER BY created_at, student_id
     LIMIT ?3 OFFSET ?4"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(
      rusqlite::params![filter.status, filter.pattern, filter.limit, filter.offset],
      RawStudent::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawStudent::into_student).collect()
}

pub fn fetch_application(conn: &Connection, id: Uuid) -> Result<Option<Application>> {
  let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE application_id = ?1");
  let raw = conn
    .query_row(&sql, rusqlite::params![encode_uuid(id)], RawApplication::from_row)
    .optional()?;
  raw.map(RawApplication::into_application).transpose()
}

/// Every application belonging to `student_id`, oldest first.
pub fn applications_of(conn: &Connection, student_id: Uuid) -> Result<Vec<Application>> {
  let sql = format!(
    "SELECT {APPLICATION_COLUMNS} FROM applications
     WHERE student_id = ?1
     ORDER BY created_at, application_id"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(rusqlite::params![encode_uuid(student_id)], RawApplication::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawApplication::into_application).collect()
}

/// Owned, bindable form of an application listing query.
pub struct ApplicationFilter {
  pub student_id: Option<String>,
  pub status:     Option<&'static str>,
  pub pattern:    Option<String>,
  pub limit:      i64,
  pub offset:     i64,
}

pub fn list_applications(
  conn: &Connection,
  filter: &ApplicationFilter,
) -> Result<Vec<Application>> {
  let sql = format!(
    "SELECT {APPLICATION_COLUMNS} FROM applications
     WHERE (?1 IS NULL OR student_id = ?1)
       AND (?2 IS NULL OR status = ?2)
       AND (?3 IS NULL OR fold(university_name) LIKE ?3 OR fold(program_name) LIKE ?3)
     ORDER BY created_at, application_id
     LIMIT ?4 OFFSET ?5"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(
      rusqlite::params![
        filter.student_id,
        filter.status,
        filter.pattern,
        filter.limit,
        filter.offset,
      ],
      RawApplication::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawApplication::into_application).collect()
}

pub fn statistics(conn: &Connection, student_id: Uuid) -> Result<Option<ApplicationStatistics>> {
  let Some(student) = fetch_student(conn, student_id)? else {
    return Ok(None);
  };
  let applications = applications_of(conn, student_id)?;
  Ok(Some(ApplicationStatistics::from_applications(&student, &applications)))
}

/// Ids of every student that is not soft-deleted.
pub fn live_student_ids(conn: &Connection) -> Result<Vec<Uuid>> {
  let mut stmt = conn.prepare(
    "SELECT student_id FROM students WHERE deleted_at IS NULL ORDER BY created_at, student_id",
  )?;
  let ids = stmt
    .query_map([], |row| row.get::<_, String>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  ids.iter().map(|s| crate::encode::decode_uuid(s)).collect()
}
