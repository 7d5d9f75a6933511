//! Visitor repository for the analytics dashboard.
//!
//! Read-only: visitor rows are written by the site binary and never mutated
//! here.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nothanks_core::VisitorId;

use super::RepositoryError;
use crate::models::Visitor;

/// Internal row type for `visitors` queries.
#[derive(Debug, sqlx::FromRow)]
struct VisitorRow {
    id: VisitorId,
    visited_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    page_url: String,
    referrer: Option<String>,
    country: Option<String>,
    region: Option<String>,
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    timezone: Option<String>,
    isp: Option<String>,
    screen: Option<String>,
    language: Option<String>,
}

impl From<VisitorRow> for Visitor {
    fn from(row: VisitorRow) -> Self {
        Self {
            id: row.id,
            visited_at: row.visited_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            page_url: row.page_url,
            referrer: row.referrer,
            country: row.country,
            region: row.region,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            timezone: row.timezone,
            isp: row.isp,
            screen: row.screen,
            language: row.language,
        }
    }
}

/// Repository for visitor reads.
pub struct VisitorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitorRepository<'a> {
    /// Create a new visitor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all visitor rows, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Visitor>, RepositoryError> {
        let rows = sqlx::query_as::<_, VisitorRow>(
            r"
            SELECT id, visited_at, ip_address, user_agent, page_url, referrer,
                   country, region, city, latitude, longitude, timezone, isp,
                   screen, language
            FROM visitors
            ORDER BY visited_at DESC, id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Visitor::from).collect())
    }
}
