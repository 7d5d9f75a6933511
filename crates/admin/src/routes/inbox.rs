//! Moderation inbox route handlers.
//!
//! Lists every submission newest first, with guarded approve/reject
//! transitions, a full edit form as the escape hatch, and delete behind a
//! confirmation page. Outcomes are reported through redirect query parameters
//! rendered as transient banners.
//!
//! The list itself is served from the in-memory [`InboxFeed`]; the SSE
//! endpoint notifies open pages when the feed changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{
        Redirect,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use nothanks_core::{RequestId, RequestStatus};

use crate::db::{ProductRequestRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{ProductRequest, RequestEdit};
use crate::state::AppState;

/// Query parameters for the inbox page (banner state).
#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Inbox list template.
#[derive(Template, WebTemplate)]
#[template(path = "inbox/index.html")]
pub struct InboxTemplate {
    pub admin_name: String,
    pub requests: Vec<ProductRequest>,
    pub pending_count: usize,
    pub success: Option<String>,
    pub error: Option<String>,
}

fn success_message(code: &str) -> String {
    match code {
        "approved" => "Request approved; it is now in the public catalog.".to_string(),
        "rejected" => "Request rejected.".to_string(),
        "edited" => "Request updated.".to_string(),
        "deleted" => "Request deleted.".to_string(),
        _ => "Done.".to_string(),
    }
}

fn error_message(code: &str) -> String {
    match code {
        "not-pending" => "This request was already reviewed; nothing changed.".to_string(),
        "conflict" => {
            "Someone else modified this request while you were editing. \
             Your changes were not applied."
                .to_string()
        }
        "missing" => "This request no longer exists.".to_string(),
        _ => "The operation failed. The request is unchanged.".to_string(),
    }
}

/// GET /dashboard/inbox
///
/// Serves the in-memory mirror; falls back to a direct fetch while the
/// change listener has not primed it yet.
///
/// # Errors
///
/// Returns `AppError::Database` if the fallback fetch fails.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(params): Query<InboxQuery>,
) -> Result<InboxTemplate> {
    let mut requests = state.feed().snapshot();
    if requests.is_empty() {
        requests = ProductRequestRepository::new(state.pool()).list_all().await?;
        state.feed().replace(requests.clone());
    }

    let pending_count = requests.iter().filter(|r| r.status.is_pending()).count();

    Ok(InboxTemplate {
        admin_name: admin.name,
        requests,
        pending_count,
        success: params.success.as_deref().map(success_message),
        error: params.error.as_deref().map(error_message),
    })
}

/// POST /dashboard/inbox/{id}/approve
///
/// # Errors
///
/// Returns `AppError::Database` on infrastructure failure; a request that is
/// no longer pending redirects back with a failure notice.
#[instrument(skip(state))]
pub async fn approve(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
) -> Result<Redirect> {
    review(&state, id, RequestStatus::Approved).await
}

/// POST /dashboard/inbox/{id}/reject
///
/// # Errors
///
/// Same failure behavior as approve.
#[instrument(skip(state))]
pub async fn reject(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
) -> Result<Redirect> {
    review(&state, id, RequestStatus::Rejected).await
}

async fn review(state: &AppState, id: RequestId, verdict: RequestStatus) -> Result<Redirect> {
    match ProductRequestRepository::new(state.pool())
        .review(id, verdict)
        .await
    {
        Ok(()) => {
            info!(%id, %verdict, "request reviewed");
            Ok(Redirect::to(&format!(
                "/dashboard/inbox?success={verdict}"
            )))
        }
        Err(RepositoryError::Conflict(_)) => {
            warn!(%id, %verdict, "review skipped: request is not pending");
            Ok(Redirect::to("/dashboard/inbox?error=not-pending"))
        }
        Err(other) => Err(other.into()),
    }
}

/// One status option in the edit form's select input.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: RequestStatus,
    pub selected: bool,
}

/// Edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "inbox/edit.html")]
pub struct EditTemplate {
    pub admin_name: String,
    pub request: ProductRequest,
    pub statuses: Vec<StatusOption>,
}

/// GET /dashboard/inbox/{id}/edit
///
/// # Errors
///
/// Returns `AppError::NotFound` if the request does not exist.
#[instrument(skip(state))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
) -> Result<EditTemplate> {
    let request = ProductRequestRepository::new(state.pool()).get(id).await?;

    let statuses = RequestStatus::ALL
        .into_iter()
        .map(|value| StatusOption {
            value,
            selected: value == request.status,
        })
        .collect();

    Ok(EditTemplate {
        admin_name: admin.name,
        request,
        statuses,
    })
}

/// Edit form fields.
///
/// `read_updated_at` is the hidden version field rendered into the form; the
/// update only applies if the row still carries that timestamp.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    pub name: String,
    pub submitted_by: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub alternatives: Option<String>,
    pub status: String,
    pub read_updated_at: String,
}

impl EditForm {
    fn into_edit(self) -> Result<RequestEdit> {
        let status: RequestStatus = self
            .status
            .parse()
            .map_err(|e: String| AppError::BadRequest(e))?;

        let read_updated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.read_updated_at)
            .map_err(|e| AppError::BadRequest(format!("invalid version timestamp: {e}")))?
            .with_timezone(&Utc);

        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("product name is required".to_string()));
        }
        let submitted_by = self.submitted_by.trim().to_string();
        if submitted_by.is_empty() {
            return Err(AppError::BadRequest(
                "submitter name is required".to_string(),
            ));
        }

        Ok(RequestEdit {
            name,
            submitted_by,
            image_url: non_empty(self.image_url),
            barcode: non_empty(self.barcode),
            category: non_empty(self.category),
            comment: non_empty(self.comment),
            evidence_url: non_empty(self.evidence_url),
            alternatives: non_empty(self.alternatives),
            status,
            read_updated_at,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// POST /dashboard/inbox/{id}/edit
///
/// # Errors
///
/// Returns `AppError::BadRequest` for unparseable form data and
/// `AppError::Database` on infrastructure failure; an edit conflict redirects
/// back with a notice.
#[instrument(skip(state, form))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
    Form(form): Form<EditForm>,
) -> Result<Redirect> {
    let edit = form.into_edit()?;

    match ProductRequestRepository::new(state.pool())
        .update(id, &edit)
        .await
    {
        Ok(()) => {
            info!(%id, status = %edit.status, "request edited");
            Ok(Redirect::to("/dashboard/inbox?success=edited"))
        }
        Err(RepositoryError::Conflict(_)) => {
            warn!(%id, "edit conflict: row version changed");
            Ok(Redirect::to("/dashboard/inbox?error=conflict"))
        }
        Err(other) => Err(other.into()),
    }
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "inbox/delete.html")]
pub struct DeleteTemplate {
    pub admin_name: String,
    pub request: ProductRequest,
}

/// GET /dashboard/inbox/{id}/delete
///
/// Deletion is destructive, so it always goes through this confirmation page.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the request does not exist.
#[instrument(skip(state))]
pub async fn delete_page(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
) -> Result<DeleteTemplate> {
    let request = ProductRequestRepository::new(state.pool()).get(id).await?;

    Ok(DeleteTemplate {
        admin_name: admin.name,
        request,
    })
}

/// POST /dashboard/inbox/{id}/delete
///
/// # Errors
///
/// Returns `AppError::Database` on infrastructure failure; a row that is
/// already gone redirects back with a notice.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    Path(id): Path<RequestId>,
) -> Result<Redirect> {
    match ProductRequestRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            info!(%id, "request deleted");
            Ok(Redirect::to("/dashboard/inbox?success=deleted"))
        }
        Err(RepositoryError::NotFound(_)) => {
            Ok(Redirect::to("/dashboard/inbox?error=missing"))
        }
        Err(other) => Err(other.into()),
    }
}

/// GET /dashboard/inbox/events
///
/// SSE stream of applied feed changes. The inbox page subscribes via
/// `EventSource` and refreshes on each message; the subscription ends when
/// the client disconnects.
#[instrument(skip_all)]
pub async fn events(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Sse<impl Stream<Item = std::result::Result<Event, std::convert::Infallible>>> {
    let mut rx = state.feed().subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(message) => {
                    if let Ok(event) = Event::default().event("change").json_data(&message) {
                        yield Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // The page only refreshes on events, so a lagged
                    // subscriber just needs one catch-all nudge
                    warn!(skipped, "SSE subscriber lagged behind the feed");
                    yield Ok(Event::default().event("change").data("{}"));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
