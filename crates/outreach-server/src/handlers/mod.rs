//! Route handlers, one module per resource.

pub mod auth;
pub mod contacts;
pub mod emails;
pub mod resume;
