//! HTTP server assembly for Wayfare.
//!
//! Mounts the JSON API from [`wayfare_api`] under `/api`, adds request
//! tracing, and owns the server configuration.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use config::{ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use wayfare_core::{BookingService, store::BookingStore};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `WAYFARE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` is expanded.
  pub store_path: PathBuf,
}

impl ServerConfig {
  /// Layer the optional file at `path` under the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::build(
      config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(config::Environment::with_prefix("WAYFARE")),
    )
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    builder
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("store_path", "wayfare.db")?
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~/` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(service: Arc<BookingService<S>>) -> Router
where
  S: BookingStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", wayfare_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{File, FileFormat};
  use tower::ServiceExt as _;
  use wayfare_core::BookingService;
  use wayfare_store_sqlite::SqliteStore;

  use super::*;

  #[test]
  fn defaults_fill_missing_keys() {
    let cfg = ServerConfig::build(config::Config::builder()).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("wayfare.db"));
    assert_eq!(cfg.address(), "127.0.0.1:8080");
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = ServerConfig::build(config::Config::builder().add_source(
      File::from_str(
        "port = 9000\nstore_path = \"/var/lib/wayfare/bookings.db\"",
        FileFormat::Toml,
      ),
    ))
    .unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.resolved_store_path(), PathBuf::from("/var/lib/wayfare/bookings.db"));
  }

  #[test]
  fn missing_config_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/wayfare.toml")).unwrap();
    assert!(!cfg.host.is_empty());
  }

  #[test]
  fn tilde_is_expanded_against_home() {
    let expanded = expand_tilde(Path::new("~/data/wayfare.db"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expanded, PathBuf::from(home).join("data/wayfare.db"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }

  #[tokio::test]
  async fn api_is_mounted_under_prefix() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let app = router(Arc::new(BookingService::new(store)));

    let health = app
      .clone()
      .oneshot(Request::get("/health").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let stats = app
      .oneshot(Request::get("/api/bookings/stats").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(stats.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(stats.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["total_bookings"], 0);
  }
}
