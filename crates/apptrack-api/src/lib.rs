//! JSON REST API for apptrack.
//!
//! Exposes an axum [`Router`] backed by any
//! [`apptrack_core::store::ApplicationStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", apptrack_api::api_router(store.clone()))
//! ```

pub mod applications;
pub mod error;
pub mod extract;
pub mod health;
pub mod students;

use std::sync::Arc;

use apptrack_core::store::ApplicationStore;
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ApplicationStore + 'static,
{
  Router::new()
    // Students
    .route("/students", get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update::<S>)
        .delete(students::delete::<S>),
    )
    .route("/students/{id}/status", get(students::status::<S>))
    .route("/students/{id}/statistics", get(students::statistics::<S>))
    .route("/students/{id}/recompute", post(students::recompute::<S>))
    .route("/students/{id}/applications", get(students::applications::<S>))
    // Applications
    .route("/applications", get(applications::list::<S>).post(applications::create::<S>))
    .route(
      "/applications/{id}",
      get(applications::get_one::<S>)
        .put(applications::update::<S>)
        .delete(applications::delete::<S>),
    )
    // Health
    .route("/health", get(health::basic))
    .route("/health/detailed", get(health::detailed::<S>))
    .route("/health/ready", get(health::ready::<S>))
    .route("/health/live", get(health::live))
    .with_state(store)
}
