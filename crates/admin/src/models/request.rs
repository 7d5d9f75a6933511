//! Product request types as seen by the moderation inbox.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nothanks_core::{RequestId, RequestStatus};

/// A product submission under moderation.
///
/// Serializes with the same field names the database notify trigger emits
/// (`row_to_json`), so change-event payloads parse straight into this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// Full-field overwrite from the admin edit form.
///
/// The escape hatch: unlike approve/reject this may set any status. Carries
/// the `updated_at` the moderator read so the update is conditional; a
/// concurrent edit in between makes the write a no-op conflict instead of a
/// silent clobber.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEdit {
    pub name: String,
    pub submitted_by: String,
    pub image_url: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub comment: Option<String>,
    pub evidence_url: Option<String>,
    pub alternatives: Option<String>,
    pub status: RequestStatus,
    /// The row version the form was rendered from.
    pub read_updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_row_to_json_payload() {
        // Shape produced by `row_to_json` in the notify trigger
        let json = r#"{
            "id": 7,
            "name": "Bamba",
            "submitted_by": "Alice",
            "image_url": null,
            "barcode": "7290000066318",
            "category": "Food",
            "comment": null,
            "evidence_url": null,
            "alternatives": null,
            "status": "pending",
            "created_at": "2026-08-01T10:15:30.123456+00:00",
            "updated_at": "2026-08-01T10:15:30.123456+00:00"
        }"#;

        let request: ProductRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id, RequestId::new(7));
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.barcode.as_deref(), Some("7290000066318"));
        assert_eq!(request.image_url, None);
    }
}
