//! Core types and trait definitions for the outreach mailer.
//!
//! This crate is deliberately free of HTTP, SMTP and database dependencies.
//! It owns the domain model, the collaborator traits, and the bulk dispatch
//! orchestrator that ties them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod attachment;
pub mod contact;
pub mod dispatch;
pub mod error;
pub mod send_log;
pub mod store;
pub mod transport;
pub mod user;

pub use error::{Error, Result};
