//! Handlers for `/applications` endpoints.
//!
//! Every write returns the owning student's derived status as recomputed in
//! the same transaction.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/applications` | Optional `student_id`, `status`, `search`, `limit`, `offset` |
//! | `POST`   | `/applications` | Body: [`CreateBody`]; returns 201 + [`ApplicationWrite`] |
//! | `GET`    | `/applications/:id` | Single application |
//! | `PUT`    | `/applications/:id` | Body: [`UpdateBody`]; partial update |
//! | `DELETE` | `/applications/:id` | Returns the student's new status |

use std::sync::Arc;

use apptrack_core::{
  application::{
    Application, ApplicationPatch, ApplicationQuery, ApplicationWrite, NewApplication,
  },
  intake::Intake,
  status::ApplicationStatus,
  store::ApplicationStore,
  student::StudentStatus,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
  students::status_param,
};

fn intake_field(raw: Option<String>) -> Result<Option<Intake>, ApiError> {
  Ok(raw.as_deref().map(str::parse).transpose()?)
}

fn status_field(raw: Option<String>) -> Result<Option<ApplicationStatus>, ApiError> {
  status_param(raw.as_deref())
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub student_id: Option<Uuid>,
  pub status:     Option<String>,
  /// Case-insensitive substring over university and program names.
  pub search:     Option<String>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

/// `GET /applications[?student_id=...][&status=...][&search=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Application>>, ApiError>
where
  S: ApplicationStore,
{
  let query = ApplicationQuery {
    student_id: params.student_id,
    status:     status_param(params.status.as_deref())?,
    search:     params.search,
    limit:      params.limit,
    offset:     params.offset,
  };
  let applications = store.list_applications(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(applications))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /applications`.
///
/// Fields are optional at the serde level so that a missing field produces a
/// descriptive validation error rather than a generic decode failure.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub student_id:      Option<Uuid>,
  pub university_name: Option<String>,
  pub program_name:    Option<String>,
  /// e.g. `"Jan 2026"`.
  pub intake:          Option<String>,
  /// One of the status labels, e.g. `"Offer Received"`.
  pub status:          Option<String>,
}

/// `POST /applications`. Returns 201 + the stored application and the
/// student's recomputed status.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ApplicationStore,
{
  let present = [
    ("student_id", body.student_id.is_some()),
    ("university_name", body.university_name.is_some()),
    ("program_name", body.program_name.is_some()),
    ("intake", body.intake.is_some()),
    ("status", body.status.is_some()),
  ];
  let fields = (
    body.student_id,
    body.university_name,
    body.program_name,
    intake_field(body.intake)?,
    status_field(body.status)?,
  );
  let (Some(student_id), Some(university_name), Some(program_name), Some(intake), Some(status)) =
    fields
  else {
    return Err(ApiError::missing_fields(&present));
  };
  let input = NewApplication::new(student_id, university_name, program_name, intake, status)?;

  let write = store.add_application(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(write)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /applications/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Application>, ApiError>
where
  S: ApplicationStore,
{
  let application = store
    .get_application(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("application {id} not found")))?;
  Ok(Json(application))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /applications/:id`. Absent fields are left
/// unchanged; `student_id` cannot be changed.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBody {
  pub university_name: Option<String>,
  pub program_name:    Option<String>,
  pub intake:          Option<String>,
  pub status:          Option<String>,
}

/// `PUT /applications/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<ApplicationWrite>, ApiError>
where
  S: ApplicationStore,
{
  let patch = ApplicationPatch::new(
    body.university_name,
    body.program_name,
    intake_field(body.intake)?,
    status_field(body.status)?,
  )?;
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no updatable fields in request body".into()));
  }
  let write = store.update_application(id, patch).await.map_err(ApiError::from_store)?;
  Ok(Json(write))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
  pub student_status: StudentStatus,
}

/// `DELETE /applications/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError>
where
  S: ApplicationStore,
{
  let student_status = store.delete_application(id).await.map_err(ApiError::from_store)?;
  Ok(Json(DeleteResponse { student_status }))
}
