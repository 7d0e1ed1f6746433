use std::sync::Arc;

use tracing::warn;

use sso_core::RequestContext;
use sso_core::db::DatabaseError;

use crate::error::{Result, SsoError};
use crate::storage::{NewUser, UsersRepo};

pub struct AuthService {
    users: Arc<dyn UsersRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    /// Insert a user whose password is already hashed and return its id.
    ///
    /// A taken email is reported as [`SsoError::UserAlreadyExists`], both from
    /// the lookup and from a concurrent insert losing the unique constraint.
    pub async fn register_user(&self, ctx: &RequestContext, user: &NewUser) -> Result<i64> {
        match self.users.get_by_email(ctx, &user.email).await {
            Ok(_) => return Err(SsoError::UserAlreadyExists),
            Err(DatabaseError::NotFound(_)) => {}
            Err(e) => {
                warn!(request_id = ctx.request_id(), error = %e, "Email pre-check failed");
                return Err(e.into());
            }
        }

        self.users.insert(ctx, user).await.map_err(|e| match e {
            DatabaseError::Conflict(_) => SsoError::UserAlreadyExists,
            other => {
                warn!(request_id = ctx.request_id(), error = %other, "User insert failed");
                other.into()
            }
        })
    }
}
