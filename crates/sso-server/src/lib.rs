//! SSO Server Library
//!
//! Core functionality for the SSO identity service:
//! - `SQLite` storage for users and refresh tokens
//! - JWT issuing/parsing, opaque token encoding and password hashing
//! - Field validation against configured regexps
//! - Identity use cases (register, login, token rotation, email and password flows)
//! - Notification publishing for verify-email and forget-password events
//! - gRPC services (Auth, Users)

pub mod auth;
pub mod error;
pub mod notifications;
pub mod server;
pub mod services;
pub mod storage;
pub mod usecases;
pub mod validation;
