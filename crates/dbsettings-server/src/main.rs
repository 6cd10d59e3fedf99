//! dbsettings Server
//!
//! HTTP service exposing the settings store as a JSON API and as editable
//! HTML forms.
//!
//! Uses SQLite (embedded) by default, or an in-memory backend.

mod error;
mod extractors;
mod forms;
mod handlers;
mod storage;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use dbsettings_core::{SettingsBackend, SettingsStore};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use forms::FormRegistry;
use storage::{MemoryBackend, SqliteBackend};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn SettingsBackend>,
    pub forms: Arc<FormRegistry>,
    pub preload: Arc<Vec<String>>,
}

impl AppState {
    /// Open a request-scoped store, loading the configured categories
    pub async fn open_store(&self, actor: Option<String>) -> dbsettings_core::Result<SettingsStore> {
        SettingsStore::preloaded(self.backend.clone(), actor, &self.preload).await
    }
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting dbsettings server v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, backend={:?}, db={}",
        config.bind_address, config.backend, config.database_path
    );

    let backend: Arc<dyn SettingsBackend> = match config.backend {
        BackendKind::Sqlite => Arc::new(
            SqliteBackend::new(&config.database_path)
                .await
                .context("Failed to initialize database")?,
        ),
        BackendKind::Memory => {
            warn!("Using in-memory settings backend, settings will not survive a restart");
            Arc::new(MemoryBackend::new())
        }
    };

    let forms = match &config.forms_path {
        Some(path) => FormRegistry::load(path)
            .await
            .with_context(|| format!("Failed to load settings forms from {}", path.display()))?,
        None => {
            info!("SETTINGS_FORMS not set, no settings forms registered");
            FormRegistry::new()
        }
    };

    if !config.preload.is_empty() {
        info!("Preloading categories per request: {:?}", config.preload);
    }

    let state = AppState {
        backend,
        forms: Arc::new(forms),
        preload: Arc::new(config.preload),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api_routes())
        .route("/settings", get(handlers::forms::index))
        .route(
            "/settings/:form",
            get(handlers::forms::show).post(handlers::forms::submit),
        )
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings/:category",
            get(handlers::settings::list)
                .put(handlers::settings::update_many)
                .delete(handlers::settings::remove_all),
        )
        .route(
            "/settings/:category/:key",
            get(handlers::settings::get)
                .put(handlers::settings::update)
                .delete(handlers::settings::remove),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
    backend: BackendKind,
    preload: Vec<String>,
    forms_path: Option<PathBuf>,
}

fn load_config() -> Result<Config> {
    info!("Loading configuration from environment...");

    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        let path = data_dir.join("settings.db");
        path.to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let backend = match std::env::var("SETTINGS_BACKEND")
        .unwrap_or_else(|_| "sqlite".to_string())
        .as_str()
    {
        "sqlite" => BackendKind::Sqlite,
        "memory" => BackendKind::Memory,
        other => anyhow::bail!("Unknown SETTINGS_BACKEND: {} (expected sqlite or memory)", other),
    };

    let preload = std::env::var("SETTINGS_PRELOAD")
        .map(|v| parse_list(&v))
        .unwrap_or_default();

    let forms_path = std::env::var("SETTINGS_FORMS").ok().map(PathBuf::from);

    Ok(Config {
        bind_address,
        database_path,
        backend,
        preload,
        forms_path,
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}
