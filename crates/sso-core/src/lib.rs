//! SSO Core Library
//!
//! Shared functionality for the SSO service:
//! - Configuration model and layered loading
//! - `SQLite` pool helpers and the shared `DatabaseError`
//! - Request-scoped context (request id, deadline)
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use context::{DeadlineExceeded, RequestContext};
pub use error::{Error, Result};
