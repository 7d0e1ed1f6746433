//! SQLite storage for the SSO server.
//!
//! Provides persistence for users and refresh tokens, and the repository
//! traits the rest of the server is written against.

mod db;
mod models;
mod queries_tokens;
mod queries_users;
mod repo;

#[cfg(test)]
mod tests;

pub use db::Database;
pub use models::*;
pub use repo::{AuthRepo, UsersRepo};
pub use sso_core::db::{DatabaseError, PoolSettings};
