//! Product request repository for the moderation inbox.
//!
//! Approve and reject are guarded transitions out of `pending`; the edit form
//! is a full-field overwrite with an optimistic-concurrency check on
//! `updated_at`. A zero-row update is reported as a conflict, never silently
//! dropped.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use nothanks_core::{RequestId, RequestStatus};

use super::RepositoryError;
use crate::models::{ProductRequest, RequestEdit};

/// Internal row type for `product_requests` queries.
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

const SELECT_COLUMNS: &str = "id, name, submitted_by, image_url, barcode, category, \
     comment, evidence_url, alternatives, status, created_at, updated_at";

/// Repository for moderation operations on product requests.
pub struct ProductRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRequestRepository<'a> {
    /// Create a new product request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn list_all(&self) -> Result<Vec<ProductRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRequestRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM product_requests
            ORDER BY created_at DESC, id DESC
            ",
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Fetch one request by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row exists.
    pub async fn get(&self, id: RequestId) -> Result<ProductRequest, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRequestRow>(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM product_requests
            WHERE id = $1
            ",
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| RepositoryError::NotFound(format!("product request {id}")))?;

        row.try_into()
    }

    /// Transition a pending request to `approved` or `rejected`.
    ///
    /// The update is conditional on the row still being `pending`; reviewing
    /// an already-reviewed request reports a conflict and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the row is no longer pending
    /// (or does not exist), `RepositoryError::Database` for other failures.
    pub async fn review(
        &self,
        id: RequestId,
        verdict: RequestStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product_requests
            SET status = $2
            WHERE id = $1 AND status = $3
            ",
        )
        .bind(id)
        .bind(verdict)
        .bind(RequestStatus::Pending)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "product request {id} is not pending"
            )));
        }
        Ok(())
    }

    /// Full-field overwrite with an optimistic-concurrency check.
    ///
    /// Applies only when `updated_at` still matches what the edit form read;
    /// a concurrent edit in between surfaces as a conflict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a version mismatch (or missing
    /// row), `RepositoryError::Database` for other failures.
    pub async fn update(&self, id: RequestId, edit: &RequestEdit) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE product_requests
            SET name = $2, submitted_by = $3, image_url = $4, barcode = $5,
                category = $6, comment = $7, evidence_url = $8,
                alternatives = $9, status = $10
            WHERE id = $1 AND updated_at = $11
            ",
        )
        .bind(id)
        .bind(&edit.name)
        .bind(&edit.submitted_by)
        .bind(&edit.image_url)
        .bind(&edit.barcode)
        .bind(&edit.category)
        .bind(&edit.comment)
        .bind(&edit.evidence_url)
        .bind(&edit.alternatives)
        .bind(edit.status)
        .bind(edit.read_updated_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "product request {id} was modified by someone else"
            )));
        }
        Ok(())
    }

    /// Permanently delete a request.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row was deleted,
    /// `RepositoryError::Database` for other failures.
    pub async fn delete(&self, id: RequestId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product_requests WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("product request {id}")));
        }
        Ok(())
    }
}
