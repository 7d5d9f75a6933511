//! NoThanks Admin library.
//!
//! This crate provides the moderation dashboard functionality as a library,
//! allowing it to be tested and reused (the CLI uses the auth service to
//! seed moderator accounts).
//!
//! # Security
//!
//! This binary holds moderator credentials and session state. Deploy it on
//! internal infrastructure only; it has no reason to be publicly routable.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
