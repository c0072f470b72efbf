//! The `ApplicationStore` trait.
//!
//! Implemented by storage backends (e.g. `apptrack-store-sqlite`). The API
//! layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationWrite, NewApplication,
  },
  statistics::ApplicationStatistics,
  student::{
    NewStudent, RecomputeReport, StatusChange, Student, StudentPatch, StudentQuery,
    StudentStatus,
  },
};

/// Default page size for list operations.
pub const DEFAULT_LIMIT: usize = 20;
/// Upper bound on any requested page size.
pub const MAX_LIMIT: usize = 100;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub fn effective_limit(requested: Option<usize>) -> usize {
  requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// A backend error that may wrap a domain [`crate::Error`].
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain error behind this failure, if there is one. Lets callers
  /// tell "not found" or "invalid" apart from storage faults.
  fn as_core(&self) -> Option<&crate::Error>;
}

/// Abstraction over an apptrack storage backend.
///
/// Every application write (add, update, delete) must re-run
/// [`crate::resolver::resolve`] over the owning student's full application
/// set and persist the result onto the student atomically with the write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ApplicationStore: Send + Sync {
  type Error: StoreError;

  // ── Students ──────────────────────────────────────────────────────────

  /// Persist a new student with empty derived fields.
  fn add_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Retrieve a student by id. Soft-deleted students are `None`.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  fn list_students<'a>(
    &'a self,
    query: &'a StudentQuery,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + 'a;

  /// Apply a partial update to a student's contact fields.
  fn update_student(
    &self,
    id: Uuid,
    patch: StudentPatch,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Soft-delete a student. Their applications stay addressable.
  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The stored derived fields of a student.
  fn student_status(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentStatus>, Self::Error>> + Send + '_;

  // ── Applications ──────────────────────────────────────────────────────

  fn add_application(
    &self,
    input: NewApplication,
  ) -> impl Future<Output = Result<ApplicationWrite, Self::Error>> + Send + '_;

  fn get_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Application>, Self::Error>> + Send + '_;

  fn list_applications<'a>(
    &'a self,
    query: &'a ApplicationQuery,
  ) -> impl Future<Output = Result<Vec<Application>, Self::Error>> + Send + 'a;

  fn update_application(
    &self,
    id: Uuid,
    patch: ApplicationPatch,
  ) -> impl Future<Output = Result<ApplicationWrite, Self::Error>> + Send + '_;

  /// Remove an application and return the owning student's new status.
  fn delete_application(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<StudentStatus, Self::Error>> + Send + '_;

  // ── Derived data ──────────────────────────────────────────────────────

  fn statistics(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Option<ApplicationStatistics>, Self::Error>> + Send + '_;

  /// Re-run the resolver for one student and persist the result.
  fn recompute_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<StatusChange, Self::Error>> + Send + '_;

  /// Re-run the resolver for every student that is not soft-deleted.
  ///
  /// Students are recomputed independently; a failure for one is recorded
  /// in [`RecomputeReport::failed`] and does not stop the others.
  fn recompute_all(
    &self,
  ) -> impl Future<Output = Result<RecomputeReport, Self::Error>> + Send + '_;

  /// Cheap liveness probe against the backend.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
