//! Static informational pages.
//!
//! Home, about, and download are askama-rendered pages with no dynamic data
//! beyond the visitor beacon. Each view is tracked.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;
use crate::state::AppState;
use crate::tracker::ClientInfo;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate;

/// Download page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/download.html")]
pub struct DownloadTemplate;

/// GET /
#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>, client: ClientInfo) -> impl IntoResponse {
    state.tracker().record("/", client);
    HomeTemplate
}

/// GET /about
#[instrument(skip_all)]
pub async fn about(State(state): State<AppState>, client: ClientInfo) -> impl IntoResponse {
    state.tracker().record("/about", client);
    AboutTemplate
}

/// GET /download
#[instrument(skip_all)]
pub async fn download(State(state): State<AppState>, client: ClientInfo) -> impl IntoResponse {
    state.tracker().record("/download", client);
    DownloadTemplate
}
