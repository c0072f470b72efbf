//! [`SqliteStore`], the SQLite implementation of [`ApplicationStore`].

use std::{path::Path, time::Duration};

use apptrack_core::{
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationWrite, NewApplication,
  },
  statistics::ApplicationStatistics,
  store::{ApplicationStore, effective_limit},
  student::{
    NewStudent, RecomputeReport, StatusChange, Student, StudentPatch, StudentQuery,
    StudentStatus,
  },
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
  Result,
  encode::{encode_status, encode_uuid},
  reads::{self, ApplicationFilter, StudentFilter},
  schema::SCHEMA,
  writes,
};

/// How long a writer waits on another process's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// An apptrack store backed by a single SQLite file.
///
/// Clones share one reference-counted connection. All calls
/// are serialised on the connection's worker thread.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        reads::register_functions(conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Load every application of a student, oldest first, regardless of
  /// paging.
  pub async fn applications_of(&self, student_id: Uuid) -> Result<Vec<Application>> {
    self
      .conn
      .call(move |conn| Ok(reads::applications_of(conn, student_id)))
      .await?
  }
}

/// `%term%` over the folded search term, matched against `fold(column)`.
fn like_pattern(search: Option<&str>) -> Option<String> {
  search
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(|s| format!("%{}%", s.to_lowercase()))
}

fn as_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── ApplicationStore impl ───────────────────────────────────────────────────

impl ApplicationStore for SqliteStore {
  type Error = crate::Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn add_student(&self, input: NewStudent) -> Result<Student> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::insert_student(conn, &input, now)))
      .await?
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<Student>> {
    self
      .conn
      .call(move |conn| Ok(reads::fetch_student(conn, id)))
      .await?
  }

  async fn list_students(&self, query: &StudentQuery) -> Result<Vec<Student>> {
    let filter = StudentFilter {
      status:  query.status.map(encode_status),
      pattern: like_pattern(query.search.as_deref()),
      limit:   as_i64(effective_limit(query.limit)),
      offset:  as_i64(query.offset.unwrap_or(0)),
    };
    self
      .conn
      .call(move |conn| Ok(reads::list_students(conn, &filter)))
      .await?
  }

  async fn update_student(&self, id: Uuid, patch: StudentPatch) -> Result<Student> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::update_student(conn, id, &patch, now)))
      .await?
  }

  async fn delete_student(&self, id: Uuid) -> Result<()> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::soft_delete_student(conn, id, now)))
      .await?
  }

  async fn student_status(&self, id: Uuid) -> Result<Option<StudentStatus>> {
    let student = self.get_student(id).await?;
    Ok(student.as_ref().map(Student::status))
  }

  // ── Applications ──────────────────────────────────────────────────────────

  async fn add_application(&self, input: NewApplication) -> Result<ApplicationWrite> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::insert_application(conn, &input, now)))
      .await?
  }

  async fn get_application(&self, id: Uuid) -> Result<Option<Application>> {
    self
      .conn
      .call(move |conn| Ok(reads::fetch_application(conn, id)))
      .await?
  }

  async fn list_applications(&self, query: &ApplicationQuery) -> Result<Vec<Application>> {
    let filter = ApplicationFilter {
      student_id: query.student_id.map(encode_uuid),
      status:     query.status.map(encode_status),
      pattern:    like_pattern(query.search.as_deref()),
      limit:      as_i64(effective_limit(query.limit)),
      offset:     as_i64(query.offset.unwrap_or(0)),
    };
    self
      .conn
      .call(move |conn| Ok(reads::list_applications(conn, &filter)))
      .await?
  }

  async fn update_application(
    &self,
    id:    Uuid,
    patch: ApplicationPatch,
  ) -> Result<ApplicationWrite> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::update_application(conn, id, &patch, now)))
      .await?
  }

  async fn delete_application(&self, id: Uuid) -> Result<StudentStatus> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::delete_application(conn, id, now)))
      .await?
  }

  // ── Derived data ──────────────────────────────────────────────────────────

  async fn statistics(&self, student_id: Uuid) -> Result<Option<ApplicationStatistics>> {
    self
      .conn
      .call(move |conn| Ok(reads::statistics(conn, student_id)))
      .await?
  }

  async fn recompute_student(&self, id: Uuid) -> Result<StatusChange> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::recompute_student(conn, id, now)))
      .await?
  }

  async fn recompute_all(&self) -> Result<RecomputeReport> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(writes::recompute_all(conn, now)))
      .await?
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
