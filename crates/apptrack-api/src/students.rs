//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Optional `status`, `search`, `limit`, `offset` |
//! | `POST`   | `/students` | Body: [`CreateBody`]; returns 201 + student |
//! | `GET`    | `/students/:id` | 404 if missing or deleted |
//! | `PUT`    | `/students/:id` | Body: [`UpdateBody`]; partial contact update |
//! | `DELETE` | `/students/:id` | Soft delete; 204 |
//! | `GET`    | `/students/:id/status` | Derived fields only |
//! | `GET`    | `/students/:id/statistics` | Application counts and intake range |
//! | `POST`   | `/students/:id/recompute` | Re-run the resolver; returns before/after |
//! | `GET`    | `/students/:id/applications` | Optional `status`, `limit`, `offset` |

use std::sync::Arc;

use apptrack_core::{
  application::{Application, ApplicationQuery},
  statistics::ApplicationStatistics,
  status::ApplicationStatus,
  store::ApplicationStore,
  student::{NewStudent, StatusChange, Student, StudentPatch, StudentQuery, StudentStatus},
};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  error::ApiError,
  extract::{Json, Path, Query},
};

/// Parse an optional `status` query parameter.
pub(crate) fn status_param(raw: Option<&str>) -> Result<Option<ApplicationStatus>, ApiError> {
  Ok(raw.map(ApplicationStatus::parse).transpose()?)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Only students whose highest status is this label.
  pub status: Option<String>,
  /// Case-insensitive substring over name and email.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /students[?status=...][&search=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, ApiError>
where
  S: ApplicationStore,
{
  let query = StudentQuery {
    status: status_param(params.status.as_deref())?,
    search: params.search,
    limit:  params.limit,
    offset: params.offset,
  };
  let students = store.list_students(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(students))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

/// `POST /students`, body: `{"name":"...","email":"...","phone":"..."}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ApplicationStore,
{
  ApiError::missing(&[
    ("name", body.name.is_some()),
    ("email", body.email.is_some()),
    ("phone", body.phone.is_some()),
  ])?;
  let input = NewStudent::new(
    body.name.unwrap_or_default(),
    body.email.unwrap_or_default(),
    body.phone.unwrap_or_default(),
  )?;

  let student = store.add_student(input).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /students/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Student>, ApiError>
where
  S: ApplicationStore,
{
  let student = store
    .get_student(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(student))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Contact fields to change. Derived status fields are not accepted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateBody {
  pub name:  Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

/// `PUT /students/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Student>, ApiError>
where
  S: ApplicationStore,
{
  let patch = StudentPatch::new(body.name, body.email, body.phone)?;
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no updatable fields in request body".into()));
  }
  let student = store.update_student(id, patch).await.map_err(ApiError::from_store)?;
  Ok(Json(student))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /students/:id` (soft delete)
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ApplicationStore,
{
  store.delete_student(id).await.map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Derived data ─────────────────────────────────────────────────────────────

/// `GET /students/:id/status`
pub async fn status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudentStatus>, ApiError>
where
  S: ApplicationStore,
{
  let status = store
    .student_status(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(status))
}

/// `GET /students/:id/statistics`
pub async fn statistics<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ApplicationStatistics>, ApiError>
where
  S: ApplicationStore,
{
  let stats = store
    .statistics(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(stats))
}

/// `POST /students/:id/recompute`
pub async fn recompute<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StatusChange>, ApiError>
where
  S: ApplicationStore,
{
  let change = store.recompute_student(id).await.map_err(ApiError::from_store)?;
  Ok(Json(change))
}

// ─── Applications of one student ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ApplicationsParams {
  pub status: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /students/:id/applications`
pub async fn applications<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ApplicationsParams>,
) -> Result<Json<Vec<Application>>, ApiError>
where
  S: ApplicationStore,
{
  if store.get_student(id).await.map_err(ApiError::from_store)?.is_none() {
    return Err(ApiError::NotFound(format!("student {id} not found")));
  }
  let query = ApplicationQuery {
    student_id: Some(id),
    status:     status_param(params.status.as_deref())?,
    search:     None,
    limit:      params.limit,
    offset:     params.offset,
  };
  let applications = store.list_applications(&query).await.map_err(ApiError::from_store)?;
  Ok(Json(applications))
}
