//! User-submitted product request types.

use chrono::{DateTime, Utc};

use nothanks_core::{RequestId, RequestStatus};

/// A product submission as stored in the `product_requests` table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRequest {
    pub id: RequestId,
    pub name: String,
    pub submitted_by: String,
    pub image_url: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub comment: Option<String>,
    pub evidence_url: Option<String>,
    pub alternatives: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A new submission about to be inserted.
///
/// Status is not represented here: the database defaults every insert to
/// `pending`, so a submission can never enter the table in any other state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProductRequest {
    pub name: String,
    pub submitted_by: String,
    pub image_url: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub comment: Option<String>,
    pub evidence_url: Option<String>,
    pub alternatives: Option<String>,
}

/// Errors turning raw form input into a [`NewProductRequest`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("product name is required")]
    MissingName,
    #[error("submitter name is required")]
    MissingSubmitter,
}

impl NewProductRequest {
    /// Build a submission from raw form fields.
    ///
    /// All fields are trimmed; optional fields collapse to `None` when empty
    /// so the row carries real NULLs instead of empty strings.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if either required field is empty after
    /// trimming.
    pub fn from_form(
        name: &str,
        submitted_by: &str,
        barcode: Option<&str>,
        category: Option<&str>,
        comment: Option<&str>,
        evidence_url: Option<&str>,
        alternatives: Option<&str>,
    ) -> Result<Self, SubmissionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SubmissionError::MissingName);
        }
        let submitted_by = submitted_by.trim();
        if submitted_by.is_empty() {
            return Err(SubmissionError::MissingSubmitter);
        }

        Ok(Self {
            name: name.to_owned(),
            submitted_by: submitted_by.to_owned(),
            image_url: None,
            barcode: non_empty(barcode),
            category: non_empty(category),
            comment: non_empty(comment),
            evidence_url: non_empty(evidence_url),
            alternatives: non_empty(alternatives),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_fields_only() {
        let req = NewProductRequest::from_form(
            "Test Product",
            "Alice",
            None,
            None,
            None,
            None,
            None,
        )
        .unwrap();

        assert_eq!(req.name, "Test Product");
        assert_eq!(req.submitted_by, "Alice");
        assert_eq!(req.image_url, None);
        assert_eq!(req.barcode, None);
        assert_eq!(req.category, None);
        assert_eq!(req.comment, None);
        assert_eq!(req.evidence_url, None);
        assert_eq!(req.alternatives, None);
    }

    #[test]
    fn test_empty_optionals_become_none() {
        let req = NewProductRequest::from_form(
            " Bamba ",
            "Bob",
            Some("  "),
            Some(""),
            Some(" too salty "),
            None,
            None,
        )
        .unwrap();

        assert_eq!(req.name, "Bamba");
        assert_eq!(req.barcode, None);
        assert_eq!(req.category, None);
        assert_eq!(req.comment.as_deref(), Some("too salty"));
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            NewProductRequest::from_form("  ", "Alice", None, None, None, None, None),
            Err(SubmissionError::MissingName)
        );
        assert_eq!(
            NewProductRequest::from_form("Bamba", "", None, None, None, None, None),
            Err(SubmissionError::MissingSubmitter)
        );
    }
}
