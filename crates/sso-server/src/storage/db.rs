//! SQLite database for the SSO server.

sso_core::define_database!(Database, "SSO database migrations complete");
