//! Health endpoints for monitors and orchestrators. None touch
//! application data.

use std::sync::Arc;

use apptrack_core::store::ApplicationStore;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

const SERVICE: &str = "apptrack";

/// `GET /health`
pub async fn basic() -> Json<Value> {
  Json(json!({
    "status":  "healthy",
    "service": SERVICE,
    "version": env!("CARGO_PKG_VERSION"),
  }))
}

/// `GET /health/detailed`; 503 when the store does not answer.
pub async fn detailed<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<Value>)
where
  S: ApplicationStore,
{
  let (code, status, database) = match store.ping().await {
    Ok(()) => (StatusCode::OK, "healthy", "ok".to_owned()),
    Err(e) => {
      tracing::warn!(error = %e, "health check: store unreachable");
      (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", format!("error: {e}"))
    }
  };
  let body = json!({
    "status":  status,
    "service": SERVICE,
    "version": env!("CARGO_PKG_VERSION"),
    "checks":  { "database": database },
  });
  (code, Json(body))
}

/// `GET /health/ready`; 503 until the store answers.
pub async fn ready<S>(State(store): State<Arc<S>>) -> (StatusCode, Json<Value>)
where
  S: ApplicationStore,
{
  match store.ping().await {
    Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready" }))),
    Err(e) => {
      tracing::warn!(error = %e, "readiness check: store unreachable");
      let body = json!({ "status": "not_ready", "error": e.to_string() });
      (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
  }
}

/// `GET /health/live`; answers as long as the process is serving.
pub async fn live() -> Json<Value> { Json(json!({ "status": "alive" })) }
