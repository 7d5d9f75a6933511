//! Business logic services for the admin dashboard.

pub mod auth;

pub use auth::AuthService;
