//! Visitor analytics dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::instrument;

use crate::analytics::{self, RECENT_ROWS, VisitorStats};
use crate::db::VisitorRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Visitor;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_name: String,
    pub stats: VisitorStats,
    pub recent: Vec<Visitor>,
}

/// GET /dashboard
///
/// # Errors
///
/// Returns `AppError::Database` if the visitor rows cannot be fetched.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<DashboardTemplate> {
    let visitors = VisitorRepository::new(state.pool()).list_all().await?;

    let stats = VisitorStats::compute(&visitors, Utc::now());
    let recent = visitors.into_iter().take(RECENT_ROWS).collect();

    Ok(DashboardTemplate {
        admin_name: admin.name,
        stats,
        recent,
    })
}

/// GET /dashboard/visitors.csv
///
/// Exports the full visitor table as a download.
///
/// # Errors
///
/// Returns `AppError::Database` on fetch failure and `AppError::Internal` if
/// serialization fails.
#[instrument(skip_all)]
pub async fn visitors_csv(
    State(state): State<AppState>,
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> Result<impl IntoResponse> {
    let visitors = VisitorRepository::new(state.pool()).list_all().await?;

    let csv = analytics::export_csv(&visitors)
        .map_err(|e| AppError::Internal(format!("csv export failed: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"visitors.csv\""),
    );

    Ok((headers, csv))
}
