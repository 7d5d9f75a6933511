//! NoThanks Core - Shared types library.
//!
//! This crate provides common types used across all NoThanks components:
//! - `site` - Public marketing site (pages, catalog, submission form)
//! - `admin` - Internal moderation dashboard (session-gated)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and the
//!   submission review status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
