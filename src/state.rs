//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::db;
use crate::error::AppError;
use crate::file::LocalFileStorage;
use crate::search::SearchService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool; None while the service is
    /// unconfigured (no DATABASE_URL).
    db: Option<PgPool>,

    /// Full-text search over workshops; follows the pool.
    search: Option<SearchService>,

    /// Attachment file storage.
    files: LocalFileStorage,
}

impl AppState {
    /// Create new application state.
    ///
    /// A missing DATABASE_URL is not fatal: the server starts in a
    /// degraded mode where data and auth endpoints answer 503 until
    /// the variable is provided and the process restarted.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections).await?;
                info!("database connection established");
                Some(pool)
            }
            None => {
                warn!("DATABASE_URL not set; data and auth endpoints are disabled");
                None
            }
        };

        let search = db.clone().map(SearchService::new);
        let files = LocalFileStorage::new(config.uploads_dir.clone(), config.files_url.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner { db, search, files }),
        })
    }

    /// The database pool, or the configuration-missing error.
    pub fn db(&self) -> Result<&PgPool, AppError> {
        self.inner.db.as_ref().ok_or(AppError::Unconfigured)
    }

    /// The search service, or the configuration-missing error.
    pub fn search(&self) -> Result<&SearchService, AppError> {
        self.inner.search.as_ref().ok_or(AppError::Unconfigured)
    }

    /// Attachment file storage.
    pub fn files(&self) -> &LocalFileStorage {
        &self.inner.files
    }

    /// Whether the backing database is configured.
    pub fn is_configured(&self) -> bool {
        self.inner.db.is_some()
    }

    /// Check database health; false when unconfigured.
    pub async fn postgres_healthy(&self) -> bool {
        match &self.inner.db {
            Some(pool) => db::check_health(pool).await,
            None => false,
        }
    }
}
