//! Product request repository for the public site.
//!
//! The site inserts new submissions (always `pending` via the column default)
//! and reads approved rows to merge into the public catalog.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nothanks_core::{RequestId, RequestStatus};

use super::RepositoryError;
use crate::models::{NewProductRequest, ProductRequest};

/// Internal row type for `product_requests` queries.
///
/// Rows are validated before use; malformed rows are rejected rather than
/// propagated into the catalog.
#[derive(Debug, sqlx::FromRow)]
struct ProductRequestRow {
    id: RequestId,
    name: String,
    submitted_by: String,
    image_url: Option<String>,
    barcode: Option<String>,
    category: Option<String>,
    comment: Option<String>,
    evidence_url: Option<String>,
    alternatives: Option<String>,
    status: RequestStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRequestRow> for ProductRequest {
    type Error = RepositoryError;

    fn try_from(row: ProductRequestRow) -> Result<Self, Self::Error> {
        if row.name.trim().is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "product request {} has an empty name",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            name: row.name,
            submitted_by: row.submitted_by,
            image_url: row.image_url,
            barcode: row.barcode,
            category: row.category,
            comment: row.comment,
            evidence_url: row.evidence_url,
            alternatives: row.alternatives,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for product request operations available to the public site.
pub struct ProductRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRequestRepository<'a> {
    /// Create a new product request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new submission and return the stored row.
    ///
    /// The status column defaults to `pending`; it is not bindable here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        request: &NewProductRequest,
    ) -> Result<ProductRequest, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRequestRow>(
            r"
            INSERT INTO product_requests
                (name, submitted_by, image_url, barcode, category,
                 comment, evidence_url, alternatives)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, submitted_by, image_url, barcode, category,
                      comment, evidence_url, alternatives, status,
                      created_at, updated_at
            ",
        )
        .bind(&request.name)
        .bind(&request.submitted_by)
        .bind(&request.image_url)
        .bind(&request.barcode)
        .bind(&request.category)
        .bind(&request.comment)
        .bind(&request.evidence_url)
        .bind(&request.alternatives)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Fetch all approved submissions, newest first.
    ///
    /// Only approved rows are ever visible to a public surface; pending and
    /// rejected submissions stay admin-only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_approved(&self) -> Result<Vec<ProductRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRequestRow>(
            r"
            SELECT id, name, submitted_by, image_url, barcode, category,
                   comment, evidence_url, alternatives, status,
                   created_at, updated_at
            FROM product_requests
            WHERE status = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(RequestStatus::Approved)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
