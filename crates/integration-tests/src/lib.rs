//! Integration tests for the NoThanks web platform.
//!
//! # Running Tests
//!
//! The tests in `tests/` drive the real HTTP surface, so they are all
//! `#[ignore]`d by default and expect:
//!
//! - a running `PostgreSQL` database with both migration sets applied
//!   (`nt-cli migrate all`)
//! - the site server (`cargo run -p nothanks-site`, default port 3000)
//! - the admin server (`cargo run -p nothanks-admin`, default port 3001)
//! - a moderator account for the admin tests, created via
//!   `nt-cli admin create`, with `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD`
//!   set accordingly
//!
//! ```bash
//! cargo test -p nothanks-integration-tests -- --ignored
//! ```

/// Base URL for the public site (configurable via environment).
#[must_use]
pub fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin dashboard (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}
