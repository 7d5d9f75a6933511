//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::geo::GeoClient;
use crate::media::{MediaError, MediaStore};
use crate::tracker::VisitorTracker;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the database pool,
/// configuration, visitor tracker, and media store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    tracker: VisitorTracker,
    media: MediaStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the uploads directory cannot be created.
    pub fn new(config: SiteConfig, pool: PgPool) -> Result<Self, MediaError> {
        let geo = GeoClient::new(&config.geoip_url);
        let tracker = VisitorTracker::new(pool.clone(), geo);
        let media = MediaStore::new(config.uploads_dir.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tracker,
                media,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the visitor tracker.
    #[must_use]
    pub fn tracker(&self) -> &VisitorTracker {
        &self.inner.tracker
    }

    /// Get a reference to the media store.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}
