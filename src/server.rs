//! Reusable Conduit server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the server lifecycle:
//! storage selection, migrations, services, REST API, metrics and
//! graceful shutdown. [`AppServices`] and [`build_router`] are also used
//! on their own to drive the API in-process.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::{ArticleService, UserService, ViewComposer};
use crate::config::{AppConfig, DatabaseSettings, LogFormat, LoggingConfig, StorageBackend};
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::{init_database, InMemoryRepositoryProvider, SeaOrmRepositoryProvider};
use crate::interfaces::http::modules::health::HealthState;
use crate::interfaces::http::{create_api_router, ApiState};
use crate::shared::shutdown::ShutdownSignal;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true). Ignored for the in-memory backend.
    pub auto_migrate: bool,
    /// Install the global Prometheus recorder and serve `/metrics` (default: true).
    pub enable_metrics: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            enable_metrics: true,
        }
    }
}

// ── Services & router ──────────────────────────────────────────────

/// The application services over one repository provider.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub articles: Arc<ArticleService>,
    pub views: Arc<ViewComposer>,
}

impl AppServices {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        let users = Arc::new(UserService::new(repos.clone()));
        let articles = Arc::new(ArticleService::new(repos));
        let views = Arc::new(ViewComposer::new(users.clone(), articles.clone()));
        Self {
            users,
            articles,
            views,
        }
    }
}

/// Build the HTTP router for `services`. `db` enables the database probe in `/health`.
pub fn build_router(
    services: &AppServices,
    config: &AppConfig,
    db: Option<DatabaseConnection>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Router {
    let state = ApiState {
        users: services.users.clone(),
        articles: services.articles.clone(),
        views: services.views.clone(),
        jwt_config: config.security.jwt(),
        pagination: config.pagination,
    };
    let health_state = HealthState {
        db,
        started_at: Arc::new(Instant::now()),
    };
    create_api_router(state, health_state, prometheus_handle)
}

/// Open the configured storage. SQLite connections are returned for health checks and shutdown.
pub async fn open_repositories(
    settings: &DatabaseSettings,
    auto_migrate: bool,
) -> Result<(Arc<dyn RepositoryProvider>, Option<DatabaseConnection>), ServerError> {
    match settings.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Ok((Arc::new(InMemoryRepositoryProvider::new()), None))
        }
        StorageBackend::Sqlite => {
            let db = init_database(&settings.connection()).await?;
            if auto_migrate {
                info!("Running database migrations...");
                Migrator::up(&db, None).await?;
                info!("Migrations completed");
            }
            Ok((Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db)))
        }
    }
}

/// The global recorder can only be installed once per process; later calls reuse it.
fn prometheus_handle() -> Result<PrometheusHandle, ServerError> {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics(e.to_string()))?;
    info!("Prometheus metrics recorder installed");
    Ok(HANDLE.get_or_init(|| handle).clone())
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running Conduit server.
///
/// ```rust,no_run
/// use conduit::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub services: AppServices,
    pub config: AppConfig,
    /// Address the API is bound to; useful when the configured port is 0.
    pub local_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let config = opts.config;
        info!("Starting Conduit...");

        let prometheus = if opts.enable_metrics {
            Some(prometheus_handle()?)
        } else {
            None
        };

        let (repos, db) = open_repositories(&config.database, opts.auto_migrate).await?;
        let services = AppServices::new(repos);
        info!(
            expiration_hours = config.security.jwt_expiration_hours,
            "JWT configured"
        );

        let router = build_router(&services, &config, db.clone(), prometheus);

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                api_shutdown.wait().await;
                info!("REST API received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            services,
            config,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown on SIGTERM or Ctrl+C.
    pub fn install_signal_handler(&self) {
        self.shutdown.listen_for_os_signals();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop, then close the database.
    pub async fn wait(self) {
        match self.api_task.await {
            Ok(()) => info!("REST API server stopped"),
            Err(e) => error!("REST API server task panicked: {}", e),
        }

        if let Some(db) = self.db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }
        info!("Conduit shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down Conduit...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing from the logging config; `RUST_LOG` takes precedence over `level`.
///
/// Call once at process startup.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Plain => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
