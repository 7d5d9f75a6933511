//! HTTP route handlers for the admin dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//! GET  /                                - Redirect to /dashboard
//!
//! # Auth
//! GET  /login                           - Login page
//! POST /login                           - Credential login (rate limited)
//! POST /logout                          - Logout
//!
//! # Visitor analytics (session-gated)
//! GET  /dashboard                       - Metric cards + recent visitors
//! GET  /dashboard/visitors.csv          - CSV export of all visitor rows
//!
//! # Moderation inbox (session-gated)
//! GET  /dashboard/inbox                 - All submissions, newest first
//! POST /dashboard/inbox/{id}/approve    - pending -> approved
//! POST /dashboard/inbox/{id}/reject     - pending -> rejected
//! GET  /dashboard/inbox/{id}/edit       - Edit form (escape hatch)
//! POST /dashboard/inbox/{id}/edit       - Conditional full-field update
//! GET  /dashboard/inbox/{id}/delete     - Delete confirmation page
//! POST /dashboard/inbox/{id}/delete     - Delete
//! GET  /dashboard/inbox/events          - SSE live-update stream
//! ```

pub mod auth;
pub mod dashboard;
pub mod inbox;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the application router (health endpoints are wired in main).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route(
            "/login",
            get(auth::login_page)
                .post(auth::login)
                .layer(login_rate_limiter()),
        )
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::index))
        .route("/dashboard/visitors.csv", get(dashboard::visitors_csv))
        .route("/dashboard/inbox", get(inbox::index))
        .route("/dashboard/inbox/events", get(inbox::events))
        .route("/dashboard/inbox/{id}/approve", post(inbox::approve))
        .route("/dashboard/inbox/{id}/reject", post(inbox::reject))
        .route(
            "/dashboard/inbox/{id}/edit",
            get(inbox::edit_page).post(inbox::edit),
        )
        .route(
            "/dashboard/inbox/{id}/delete",
            get(inbox::delete_page).post(inbox::delete),
        )
}
