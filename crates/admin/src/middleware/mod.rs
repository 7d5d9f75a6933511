//! HTTP middleware stack for the admin dashboard.

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use session::create_session_layer;
