//! Security primitives for the SSO server.
//!
//! Provides JWT token management, password hashing and the opaque (URL-safe
//! base64) encoding used for tokens handed to clients.

pub mod claims;
pub mod encoding;
pub mod jwt;
pub mod password;

pub use claims::{Claims, TokenKind, TokenValue};
pub use jwt::{InvalidJwt, JwtManager};
