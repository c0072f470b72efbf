//! HTTP server wiring for apptrack: configuration and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use apptrack_core::store::ApplicationStore;
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Environment variables with this prefix override file settings,
/// e.g. `APPTRACK_PORT=8080`.
pub const ENV_PREFIX: &str = "APPTRACK";

/// Runtime server configuration, deserialised from `apptrack.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("apptrack.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

impl ServerConfig {
  /// Layer the environment over an optional TOML file at `path`.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let builder = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));
    Self::from_builder(builder)
  }

  fn from_builder(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
  ) -> Result<Self, config::ConfigError> {
    let mut cfg: Self = builder.build()?.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: ApplicationStore + 'static,
{
  Router::new()
    .nest("/api", apptrack_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use apptrack_store_sqlite::SqliteStore;
  use axum::{body::Body, http::Request, http::StatusCode};
  use tower::ServiceExt;

  use super::*;

  fn from_toml(toml: &str) -> ServerConfig {
    let builder = config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml));
    ServerConfig::from_builder(builder).unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    assert_eq!(from_toml(""), ServerConfig::default());
    assert_eq!(ServerConfig::default().address(), "127.0.0.1:5000");
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = from_toml("port = 8080\nstore_path = \"/var/lib/apptrack.db\"");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/apptrack.db"));
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/apptrack.toml")).unwrap();
    assert!(!cfg.host.is_empty());
  }

  #[test]
  fn tilde_expansion_only_touches_leading_home() {
    assert_eq!(expand_tilde(Path::new("/abs/db")), PathBuf::from("/abs/db"));
    assert_eq!(expand_tilde(Path::new("rel/~/db")), PathBuf::from("rel/~/db"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    }
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let router = app(Arc::new(store));

    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["service"], "apptrack");

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
