//! HTTP route handlers for the public site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About the app
//! GET  /download               - Download links
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /products               - Product catalog (search/filter/pagination)
//!
//! # Submissions
//! GET  /products/submit        - Submission form
//! POST /products/submit        - Submit a product (multipart, rate limited)
//! ```
//!
//! The informational pages and the catalog record a visitor row on each
//! view; see [`crate::tracker`].

pub mod pages;
pub mod products;
pub mod submit;

use axum::{Router, routing::get};

use crate::middleware::submit_rate_limiter;
use crate::state::AppState;

/// Create the page routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/download", get(pages::download))
        .route("/products", get(products::index))
        .route(
            "/products/submit",
            get(submit::form).post(submit::submit).layer(submit_rate_limiter()),
        )
}
