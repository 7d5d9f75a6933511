//! Domain models for the public site.

pub mod request;
pub mod visitor;

pub use request::{NewProductRequest, ProductRequest};
pub use visitor::NewVisitor;
