// ===========================================
// tests/integration/postgres_storage_tests.rs
// ===========================================
//! `PgStorage` against a live database. Skipped unless `TEST_DATABASE_URL` is set.
use backend_lib::error::AppError;
use backend_lib::storage::{NewUser, NewVerificationToken, PgStorage, Storage};
use chrono::{Duration, Utc};

async fn connect() -> Option<PgStorage> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let storage = PgStorage::connect(&url, 2).await.unwrap();
    storage.migrate().await.unwrap();
    Some(storage)
}

#[tokio::test]
async fn test_postgres_user_and_token_lifecycle() {
    let Some(storage) = connect().await else {
        return;
    };
    let email = format!("pg-{}@example.com", uuid::Uuid::new_v4());

    storage.ping().await.unwrap();
    assert_eq!(storage.backend_name(), "postgres");

    let user = storage
        .create_user(NewUser {
            email: email.clone(),
            name: Some("Ada".to_string()),
            password_hash: Some("hash".to_string()),
        })
        .await
        .unwrap();
    assert!(!user.email_verified);

    let duplicate = storage
        .create_user(NewUser {
            email: email.clone(),
            name: None,
            password_hash: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(duplicate, AppError::Conflict(_)));

    let token_value = format!("tok-{}", uuid::Uuid::new_v4());
    let token = storage
        .create_verification_token(NewVerificationToken {
            token: token_value.clone(),
            email: email.clone(),
            user_id: user.id,
            expires_at: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap();

    let found = storage.find_verification_token(&token_value).await.unwrap();
    assert_eq!(found.map(|t| t.id), Some(token.id));

    storage
        .complete_email_verification(token.id, user.id, Utc::now())
        .await
        .unwrap();
    let verified = storage.find_user_by_email(&email).await.unwrap().unwrap();
    assert!(verified.email_verified);
    assert!(storage.find_verification_token(&token_value).await.unwrap().is_none());

    storage.delete_user(user.id).await.unwrap();
    assert!(storage.find_user_by_id(user.id).await.unwrap().is_none());
    storage.close().await;
}
