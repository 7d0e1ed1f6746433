//! gRPC server implementations for the SSO service.

pub mod auth_svc;
pub mod grpc_util;
pub mod users_svc;

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_helpers;

pub use auth_svc::AuthServiceImpl;
pub use users_svc::UsersServiceImpl;
