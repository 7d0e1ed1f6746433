//! Thin domain layer over the repositories.
//!
//! `AuthService` owns the registration pre-check; `UsersService` folds every
//! lookup failure into [`SsoError::UserNotFound`](crate::error::SsoError).

mod auth;
mod users;

pub use auth::AuthService;
pub use users::UsersService;
