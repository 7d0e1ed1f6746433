//! SSO Protocol Buffers
//!
//! Generated protobuf code for the SSO gRPC API.
//!
//! This crate contains:
//! - `AuthService` for registration, login, token rotation and the
//!   email-verification / password-reset flows
//! - `UsersService` for profile lookup and update

#![allow(clippy::derive_partial_eq_without_eq)]

/// SSO v1 API definitions.
///
/// All generated types and services are included here.
pub mod v1 {
    tonic::include_proto!("sso.v1");
}

// Re-export v1 as the default API version for convenience
pub use v1::*;

// Re-export prost_types for downstream crates that need Timestamp conversion
pub use prost_types;
