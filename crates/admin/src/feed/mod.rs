//! Live inbox feed.
//!
//! The moderation inbox keeps an in-memory mirror of `product_requests`,
//! updated from the database's notify channel instead of refetching on every
//! change. The mirror is a local cache, not a second source of truth:
//!
//! - inserts merge at their sorted position (newest first), so a burst of
//!   submissions never leaves the list out of order;
//! - updates apply only when the event's `updated_at` is not older than the
//!   cached row's, so a stale event can never overwrite a newer state;
//! - deletes remove the row.
//!
//! Malformed payloads are rejected at the boundary with a warning rather than
//! propagated into view state. Applied events fan out through a broadcast hub
//! to the SSE endpoint, which tells open inbox pages to refresh.

mod listener;

pub use listener::spawn_change_listener;

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use nothanks_core::RequestId;

use crate::models::ProductRequest;

/// Capacity of the broadcast channel feeding SSE subscribers.
const HUB_CAPACITY: usize = 64;

/// A parsed change notification from the `product_requests_changed` channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Insert(ProductRequest),
    Update(ProductRequest),
    Delete(RequestId),
}

impl ChangeEvent {
    /// The id of the affected row.
    #[must_use]
    pub fn id(&self) -> RequestId {
        match self {
            Self::Insert(row) | Self::Update(row) => row.id,
            Self::Delete(id) => *id,
        }
    }

    /// Short operation name, used in the SSE payload.
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
        }
    }
}

/// Wire shape of the notify payload emitted by the database trigger.
#[derive(Debug, Deserialize)]
struct RawChangePayload {
    op: String,
    id: RequestId,
    #[serde(default)]
    row: Option<ProductRequest>,
}

/// Errors parsing a notify payload.
#[derive(Debug, thiserror::Error)]
pub enum ChangeEventError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown op {0:?}")]
    UnknownOp(String),
    #[error("{0} payload is missing the row")]
    MissingRow(&'static str),
}

impl std::str::FromStr for ChangeEvent {
    type Err = ChangeEventError;

    fn from_str(payload: &str) -> Result<Self, Self::Err> {
        let raw: RawChangePayload = serde_json::from_str(payload)?;
        match raw.op.as_str() {
            "insert" => raw
                .row
                .map(Self::Insert)
                .ok_or(ChangeEventError::MissingRow("insert")),
            "update" => raw
                .row
                .map(Self::Update)
                .ok_or(ChangeEventError::MissingRow("update")),
            "delete" => Ok(Self::Delete(raw.id)),
            other => Err(ChangeEventError::UnknownOp(other.to_string())),
        }
    }
}

/// Message fanned out to SSE subscribers after an event is applied.
#[derive(Debug, Clone, Serialize)]
pub struct FeedMessage {
    pub op: &'static str,
    pub id: RequestId,
}

/// In-memory mirror of the `product_requests` table, newest first.
#[derive(Clone)]
pub struct InboxFeed {
    rows: Arc<RwLock<Vec<ProductRequest>>>,
    hub: broadcast::Sender<FeedMessage>,
}

impl Default for InboxFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl InboxFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        let (hub, _) = broadcast::channel(HUB_CAPACITY);
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            hub,
        }
    }

    /// Replace the entire mirror with a fresh fetch.
    ///
    /// Rows are re-sorted here, so the caller does not have to rely on the
    /// query's ordering.
    pub fn replace(&self, mut rows: Vec<ProductRequest>) {
        sort_newest_first(&mut rows);
        if let Ok(mut guard) = self.rows.write() {
            *guard = rows;
        }
    }

    /// Current contents, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ProductRequest> {
        self.rows.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Subscribe to applied-event notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FeedMessage> {
        self.hub.subscribe()
    }

    /// Apply one change event to the mirror and notify subscribers.
    ///
    /// Returns whether the mirror changed. A stale update (older `updated_at`
    /// than the cached row) is ignored.
    pub fn apply(&self, event: ChangeEvent) -> bool {
        let changed = match &event {
            ChangeEvent::Insert(row) => self.upsert(row),
            ChangeEvent::Update(row) => self.update(row),
            ChangeEvent::Delete(id) => self.remove(*id),
        };

        if changed {
            // Send fails only when no subscriber is connected, which is fine
            let _ = self.hub.send(FeedMessage {
                op: event.op(),
                id: event.id(),
            });
        }
        changed
    }

    /// Insert a row at its sorted position, replacing any stale copy.
    ///
    /// At-least-once delivery means an insert event can arrive for a row the
    /// initial fetch already saw; treat that as an update rather than
    /// producing a duplicate.
    fn upsert(&self, row: &ProductRequest) -> bool {
        let Ok(mut rows) = self.rows.write() else {
            return false;
        };

        if rows.iter().any(|r| r.id == row.id) {
            drop(rows);
            return self.update(row);
        }

        let at = rows.partition_point(|r| sort_key(r) > sort_key(row));
        rows.insert(at, row.clone());
        true
    }

    /// Apply an update unless the cached row is newer.
    fn update(&self, row: &ProductRequest) -> bool {
        let Ok(mut rows) = self.rows.write() else {
            return false;
        };

        match rows.iter_mut().find(|r| r.id == row.id) {
            Some(cached) if cached.updated_at <= row.updated_at => {
                *cached = row.clone();
                true
            }
            Some(_) => false,
            // Update for a row we never saw (missed insert): merge it in
            None => {
                let at = rows.partition_point(|r| sort_key(r) > sort_key(row));
                rows.insert(at, row.clone());
                true
            }
        }
    }

    fn remove(&self, id: RequestId) -> bool {
        let Ok(mut rows) = self.rows.write() else {
            return false;
        };
        let before = rows.len();
        rows.retain(|r| r.id != id);
        rows.len() != before
    }
}

/// Newest first, id as tiebreaker for rows created in the same instant.
fn sort_key(row: &ProductRequest) -> (chrono::DateTime<chrono::Utc>, RequestId) {
    (row.created_at, row.id)
}

fn sort_newest_first(rows: &mut [ProductRequest]) {
    rows.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};

    use nothanks_core::RequestStatus;

    use super::*;

    fn request(id: i64, minutes_ago: i64) -> ProductRequest {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        ProductRequest {
            id: RequestId::new(id),
            name: format!("Product {id}"),
            submitted_by: "Alice".to_string(),
            image_url: None,
            barcode: None,
            category: None,
            comment: None,
            evidence_url: None,
            alternatives: None,
            status: RequestStatus::Pending,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(feed: &InboxFeed) -> Vec<i64> {
        feed.snapshot().iter().map(|r| r.id.get()).collect()
    }

    #[test]
    fn test_out_of_order_insert_lands_sorted() {
        let feed = InboxFeed::new();
        feed.replace(vec![request(1, 30), request(3, 10)]);

        // Row 2 was created between the two existing rows but its event
        // arrives last; it must not end up appended at the edge.
        assert!(feed.apply(ChangeEvent::Insert(request(2, 20))));
        assert_eq!(ids(&feed), vec![3, 2, 1]);
    }

    #[test]
    fn test_two_inserts_yield_two_rows() {
        let feed = InboxFeed::new();
        feed.apply(ChangeEvent::Insert(request(1, 5)));
        feed.apply(ChangeEvent::Insert(request(2, 1)));
        assert_eq!(ids(&feed), vec![2, 1]);
    }

    #[test]
    fn test_duplicate_insert_does_not_duplicate() {
        let feed = InboxFeed::new();
        feed.replace(vec![request(1, 5)]);
        // At-least-once delivery: the same insert arrives again
        feed.apply(ChangeEvent::Insert(request(1, 5)));
        assert_eq!(ids(&feed), vec![1]);
    }

    #[test]
    fn test_stale_update_is_ignored() {
        let feed = InboxFeed::new();
        let mut fresh = request(1, 10);
        fresh.updated_at = Utc::now();
        fresh.status = RequestStatus::Approved;
        feed.replace(vec![fresh.clone()]);

        let mut stale = request(1, 10);
        stale.updated_at = Utc::now() - Duration::minutes(5);
        stale.status = RequestStatus::Rejected;

        assert!(!feed.apply(ChangeEvent::Update(stale)));
        assert_eq!(feed.snapshot().first().unwrap().status, RequestStatus::Approved);
    }

    #[test]
    fn test_newer_update_applies() {
        let feed = InboxFeed::new();
        feed.replace(vec![request(1, 10)]);

        let mut newer = request(1, 10);
        newer.updated_at = Utc::now() + Duration::seconds(1);
        newer.status = RequestStatus::Approved;

        assert!(feed.apply(ChangeEvent::Update(newer)));
        assert_eq!(feed.snapshot().first().unwrap().status, RequestStatus::Approved);
    }

    #[test]
    fn test_delete_removes_row() {
        let feed = InboxFeed::new();
        feed.replace(vec![request(1, 10), request(2, 5)]);

        assert!(feed.apply(ChangeEvent::Delete(RequestId::new(1))));
        assert_eq!(ids(&feed), vec![2]);

        // Deleting again is a no-op, not an error
        assert!(!feed.apply(ChangeEvent::Delete(RequestId::new(1))));
    }

    #[test]
    fn test_applied_events_reach_subscribers() {
        let feed = InboxFeed::new();
        let mut rx = feed.subscribe();

        feed.apply(ChangeEvent::Insert(request(1, 1)));
        let message = rx.try_recv().unwrap();
        assert_eq!(message.op, "insert");
        assert_eq!(message.id, RequestId::new(1));

        // An ignored event produces no message
        let mut stale = request(1, 1);
        stale.updated_at = Utc::now() - Duration::hours(1);
        feed.apply(ChangeEvent::Update(stale));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_parses_payloads() {
        let insert: ChangeEvent = r#"{
            "op": "insert",
            "id": 4,
            "row": {
                "id": 4, "name": "Wix", "submitted_by": "Bob",
                "image_url": null, "barcode": null, "category": "Tech",
                "comment": null, "evidence_url": null, "alternatives": null,
                "status": "pending",
                "created_at": "2026-08-01T09:00:00+00:00",
                "updated_at": "2026-08-01T09:00:00+00:00"
            }
        }"#
        .parse()
        .unwrap();
        assert!(matches!(insert, ChangeEvent::Insert(_)));

        let delete: ChangeEvent = r#"{"op": "delete", "id": 9}"#.parse().unwrap();
        assert_eq!(delete, ChangeEvent::Delete(RequestId::new(9)));
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert!("not json".parse::<ChangeEvent>().is_err());
        assert!(r#"{"op": "truncate", "id": 1}"#.parse::<ChangeEvent>().is_err());
        assert!(r#"{"op": "insert", "id": 1}"#.parse::<ChangeEvent>().is_err());
    }
}
