//! Visitor repository for the public site.
//!
//! Insert-only: the site records page views and never reads them back.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::NewVisitor;

/// Repository for visitor row inserts.
pub struct VisitorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VisitorRepository<'a> {
    /// Create a new visitor repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert one visitor row.
    ///
    /// `visited_at` is stamped by the column default at write time. There is
    /// deliberately no deduplication: every tracked page view produces its
    /// own row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, visitor: &NewVisitor) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO visitors
                (page_url, ip_address, user_agent, referrer, language, screen,
                 country, region, city, latitude, longitude, timezone, isp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(&visitor.page_url)
        .bind(&visitor.ip_address)
        .bind(&visitor.user_agent)
        .bind(&visitor.referrer)
        .bind(&visitor.language)
        .bind(&visitor.screen)
        .bind(&visitor.country)
        .bind(&visitor.region)
        .bind(&visitor.city)
        .bind(visitor.latitude)
        .bind(visitor.longitude)
        .bind(&visitor.timezone)
        .bind(&visitor.isp)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
