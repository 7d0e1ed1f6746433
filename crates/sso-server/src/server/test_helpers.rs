//! Shared test helpers for use-case and gRPC service test modules.

use std::sync::Arc;

use jsonwebtoken::Algorithm;
use tonic::Request;

use sso_core::RequestContext;
use sso_core::config::{SubjectsConfig, ValidationConfig};

use crate::auth::{JwtManager, TokenKind, encoding};
use crate::notifications::{MemoryPublisher, Notifier};
use crate::storage::Database;
use crate::usecases::{RegisterUser, TokenPair, UseCases};
use crate::validation::Validator;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-testing";
pub const VERIFY_SUBJECT: &str = "test.verify-email";
pub const FORGET_SUBJECT: &str = "test.forget-password";

/// Everything a test needs to drive the identity core end to end.
pub struct Harness {
    pub usecases: Arc<UseCases>,
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub publisher: Arc<MemoryPublisher>,
    pub ctx: RequestContext,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_publisher(MemoryPublisher::default()).await
    }

    pub async fn with_publisher(publisher: MemoryPublisher) -> Self {
        let db = Database::open_in_memory().await.unwrap();
        let jwt = Arc::new(JwtManager::new(TEST_SECRET, Algorithm::HS256, 900, 86400));
        let publisher = Arc::new(publisher);
        let notifier = Notifier::new(
            publisher.clone(),
            SubjectsConfig {
                verify_email: VERIFY_SUBJECT.into(),
                forget_password: FORGET_SUBJECT.into(),
            },
        );
        let validator = Validator::new(&ValidationConfig::default()).unwrap();

        let usecases = Arc::new(UseCases::new(
            Arc::new(db.clone()),
            Arc::new(db.clone()),
            Arc::clone(&jwt),
            validator,
            notifier,
            4,
        ));

        Self {
            usecases,
            db,
            jwt,
            publisher,
            ctx: RequestContext::new("test-request"),
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> i64 {
        self.usecases
            .register(
                &self.ctx,
                RegisterUser {
                    email: email.into(),
                    password: password.into(),
                    display_name: "Test User".into(),
                },
            )
            .await
            .unwrap()
    }

    /// Opaque token from the latest verify-email event.
    pub fn last_verify_token(&self) -> String {
        self.publisher.last_event(VERIFY_SUBJECT).unwrap().token
    }

    /// Opaque token from the latest forget-password event.
    pub fn last_forget_token(&self) -> String {
        self.publisher.last_event(FORGET_SUBJECT).unwrap().token
    }

    pub async fn register_verified(&self, email: &str, password: &str) -> i64 {
        let id = self.register(email, password).await;
        self.usecases
            .verify_user_email(&self.ctx, &self.last_verify_token())
            .await
            .unwrap();
        id
    }

    pub async fn login(&self, email: &str, password: &str) -> TokenPair {
        self.usecases
            .login(&self.ctx, email, password)
            .await
            .unwrap()
    }

    /// A signed, opaque-encoded token of `kind` for `user_id`.
    pub fn opaque_token(&self, user_id: i64, kind: TokenKind) -> String {
        let (token, _) = self
            .jwt
            .generate(crate::auth::TokenValue::UserId(user_id), kind, 60)
            .unwrap();
        encoding::encode(token)
    }
}

/// Create a `Request<T>` carrying an `x-request-id` header.
pub fn make_request<T>(inner: T) -> Request<T> {
    let mut req = Request::new(inner);
    req.metadata_mut()
        .insert("x-request-id", "test-request".parse().unwrap());
    req
}
