//! HTTP middleware stack for the public site.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (CSP, frame options, etc.)
//! 5. Rate limiting (governor, submission form only)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use rate_limit::submit_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
