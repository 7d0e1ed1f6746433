//! Storage layer tests for the SSO server.

use std::time::Duration;

use sso_core::RequestContext;
use sso_core::db::{DatabaseError, unix_timestamp};

use super::db::Database;
use super::models::{NewUser, Pagination, ProfilePatch};
use super::repo::{AuthRepo, UsersRepo};

async fn test_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: "hash123".to_string(),
        display_name: "Alice".to_string(),
    }
}

// === User tests ===

#[tokio::test]
async fn insert_and_get_user() {
    let db = test_db().await;
    let id = db.insert_user(&new_user("alice@x.test")).await.unwrap();
    assert_eq!(id, 1);

    let user = db.get_user(id).await.unwrap();
    assert_eq!(user.email, "alice@x.test");
    assert_eq!(user.display_name, "Alice");
    assert!(!user.email_confirmed);
    assert!(!user.phone_confirmed);
    assert!(!user.telegram_confirmed);
    assert!(user.phone.is_none());
    assert!(user.created_at > 0);
    assert_eq!(user.created_at, user.updated_at);
}

#[tokio::test]
async fn ids_are_monotonic() {
    let db = test_db().await;
    let a = db.insert_user(&new_user("a@x.test")).await.unwrap();
    let b = db.insert_user(&new_user("b@x.test")).await.unwrap();
    assert!(b > a);
}

#[tokio::test]
async fn duplicate_email_is_conflict() {
    let db = test_db().await;
    db.insert_user(&new_user("alice@x.test")).await.unwrap();

    let err = db.insert_user(&new_user("alice@x.test")).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn email_lookup_is_case_preserving() {
    let db = test_db().await;
    db.insert_user(&new_user("Alice@x.test")).await.unwrap();

    assert!(db.get_user_by_email("Alice@x.test").await.is_ok());
    assert!(matches!(
        db.get_user_by_email("alice@x.test").await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn missing_user_is_not_found() {
    let db = test_db().await;
    assert!(matches!(db.get_user(42).await, Err(DatabaseError::NotFound(_))));
    assert!(matches!(
        db.set_email_confirmed(42).await,
        Err(DatabaseError::NotFound(_))
    ));
    assert!(matches!(
        db.set_password(42, "h").await,
        Err(DatabaseError::NotFound(_))
    ));
    assert!(matches!(
        db.update_user_profile(42, &ProfilePatch::default()).await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn list_users_with_and_without_pagination() {
    let db = test_db().await;
    for i in 0..5 {
        db.insert_user(&new_user(&format!("u{i}@x.test"))).await.unwrap();
    }

    let all = db.list_users(None).await.unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.windows(2).all(|w| w[0].id < w[1].id));

    let page = db
        .list_users(Some(Pagination { limit: 2, offset: 1 }))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].email, "u1@x.test");
    assert_eq!(page[1].email, "u2@x.test");

    let default_limit = db
        .list_users(Some(Pagination { limit: 0, offset: 0 }))
        .await
        .unwrap();
    assert_eq!(default_limit.len(), 5);
}

#[tokio::test]
async fn profile_patch_only_touches_present_fields() {
    let db = test_db().await;
    let id = db.insert_user(&new_user("alice@x.test")).await.unwrap();

    db.update_user_profile(
        id,
        &ProfilePatch {
            phone: Some("+15551234567".into()),
            ..ProfilePatch::default()
        },
    )
    .await
    .unwrap();

    db.update_user_profile(
        id,
        &ProfilePatch {
            display_name: Some("Alicia".into()),
            ..ProfilePatch::default()
        },
    )
    .await
    .unwrap();

    let user = db.get_user(id).await.unwrap();
    assert_eq!(user.display_name, "Alicia");
    assert_eq!(user.phone.as_deref(), Some("+15551234567"));
    assert!(user.telegram.is_none());
    assert!(user.avatar.is_none());
}

#[tokio::test]
async fn confirm_email_and_set_password() {
    let db = test_db().await;
    let id = db.insert_user(&new_user("alice@x.test")).await.unwrap();

    db.set_email_confirmed(id).await.unwrap();
    db.set_password(id, "newhash").await.unwrap();

    let user = db.get_user(id).await.unwrap();
    assert!(user.email_confirmed);
    assert_eq!(user.password_hash, "newhash");
}

#[tokio::test]
async fn email_confirmation_happens_once() {
    let db = test_db().await;
    let id = db.insert_user(&new_user("alice@x.test")).await.unwrap();

    db.set_email_confirmed(id).await.unwrap();
    assert!(matches!(
        db.set_email_confirmed(id).await,
        Err(DatabaseError::Conflict(_))
    ));
}

// === Refresh token tests ===

#[tokio::test]
async fn create_and_get_active_token() {
    let db = test_db().await;
    let uid = db.insert_user(&new_user("alice@x.test")).await.unwrap();

    let ttl = unix_timestamp() + 3600;
    db.create_refresh_token(uid, "r1", ttl).await.unwrap();

    let token = db.get_active_refresh_token_by_user(uid).await.unwrap();
    assert_eq!(token.value, "r1");
    assert_eq!(token.user_id, uid);
    assert_eq!(token.ttl, ttl);
}

#[tokio::test]
async fn creating_a_token_expires_the_previous_one() {
    let db = test_db().await;
    let uid = db.insert_user(&new_user("alice@x.test")).await.unwrap();
    let ttl = unix_timestamp() + 3600;

    db.create_refresh_token(uid, "r1", ttl).await.unwrap();
    db.create_refresh_token(uid, "r2", ttl).await.unwrap();

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ? AND ttl > ?",
    )
    .bind(uid)
    .bind(unix_timestamp())
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(active, 1);

    let token = db.get_active_refresh_token_by_user(uid).await.unwrap();
    assert_eq!(token.value, "r2");
}

#[tokio::test]
async fn duplicate_token_value_is_conflict() {
    let db = test_db().await;
    let uid = db.insert_user(&new_user("alice@x.test")).await.unwrap();
    let ttl = unix_timestamp() + 3600;

    db.create_refresh_token(uid, "r1", ttl).await.unwrap();
    let err = db.create_refresh_token(uid, "r1", ttl).await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)), "got {err:?}");

    // The failed insert rolled back the expiry of the existing token.
    let token = db.get_active_refresh_token_by_user(uid).await.unwrap();
    assert_eq!(token.value, "r1");
}

#[tokio::test]
async fn expired_token_is_not_active() {
    let db = test_db().await;
    let uid = db.insert_user(&new_user("alice@x.test")).await.unwrap();

    db.create_refresh_token(uid, "old", unix_timestamp() - 10)
        .await
        .unwrap();

    assert!(matches!(
        db.get_active_refresh_token_by_user(uid).await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn expire_is_compare_and_set() {
    let db = test_db().await;
    let uid = db.insert_user(&new_user("alice@x.test")).await.unwrap();
    db.create_refresh_token(uid, "r1", unix_timestamp() + 3600)
        .await
        .unwrap();

    db.expire_refresh_token("r1").await.unwrap();
    assert!(db.get_active_refresh_token_by_user(uid).await.is_err());

    assert!(matches!(
        db.expire_refresh_token("r1").await,
        Err(DatabaseError::NotFound(_))
    ));
    assert!(matches!(
        db.expire_refresh_token("unknown").await,
        Err(DatabaseError::NotFound(_))
    ));
}

#[tokio::test]
async fn gc_deletes_only_expired_tokens() {
    let db = test_db().await;
    let a = db.insert_user(&new_user("a@x.test")).await.unwrap();
    let b = db.insert_user(&new_user("b@x.test")).await.unwrap();
    let now = unix_timestamp();

    db.create_refresh_token(a, "a1", now - 100).await.unwrap();
    db.create_refresh_token(b, "b1", now + 3600).await.unwrap();

    let removed = db.delete_expired_refresh_tokens(now).await.unwrap();
    assert_eq!(removed, 1);
    assert!(db.get_active_refresh_token_by_user(b).await.is_ok());
}

#[tokio::test]
async fn token_for_unknown_user_is_rejected() {
    let db = test_db().await;
    let err = db
        .create_refresh_token(999, "r1", unix_timestamp() + 3600)
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Query(_)), "got {err:?}");
}

// === Repository trait tests ===

#[tokio::test]
async fn repositories_delegate_to_queries() {
    let db = test_db().await;
    let ctx = RequestContext::background();

    let id = UsersRepo::insert(&db, &ctx, &new_user("alice@x.test"))
        .await
        .unwrap();
    let user = db.get_by_email(&ctx, "alice@x.test").await.unwrap();
    assert_eq!(user.id, id);
    assert_eq!(db.get_by_id(&ctx, id).await.unwrap().email, "alice@x.test");
    assert_eq!(db.list(&ctx, None).await.unwrap().len(), 1);

    let ttl = unix_timestamp() + 60;
    AuthRepo::create_refresh_token(&db, &ctx, id, "r1", ttl)
        .await
        .unwrap();
    let token = AuthRepo::get_active_refresh_token_by_user(&db, &ctx, id)
        .await
        .unwrap();
    assert_eq!(token.value, "r1");
    AuthRepo::expire_refresh_token(&db, &ctx, "r1").await.unwrap();
}

#[tokio::test]
async fn elapsed_deadline_fails_repository_call() {
    let db = test_db().await;
    let ctx = RequestContext::background().with_timeout(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let err = db.get_by_id(&ctx, 1).await.unwrap_err();
    assert!(matches!(err, DatabaseError::DeadlineExceeded), "got {err:?}");
}
