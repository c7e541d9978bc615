// ====================================
// tests/integration/auth_flow_tests.rs
// ====================================
//! End-to-end account flows over the HTTP router
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use backend_lib::storage::{NewUser, NewVerificationToken, Storage};
use chrono::{Duration, Utc};
use serde_json::json;

use crate::test_utils::{json_request, setup_test_app};

#[tokio::test]
async fn test_hello_and_health() {
    let app = setup_test_app();

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        Request::builder().uri("/").body(Body::empty()).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello World!");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "memory");
}

#[tokio::test]
async fn test_full_account_lifecycle() {
    let app = setup_test_app();

    // register
    let (status, body) = app
        .post_json(
            "/auth/register",
            json!({ "email": " Ada@Example.com ", "name": "Ada", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["emailVerified"], false);
    assert_eq!(app.storage.user_count(), 1);

    // login is refused until the email is verified
    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "ada@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_004");

    // verify
    let token = app.verification_token_for("ada@example.com");
    let (status, body) = app.get(&format!("/auth/verify-email/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email verified successfully");
    let user_id = body["userId"].as_str().unwrap().to_string();

    // login
    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "ADA@example.com", "password": "secret1", "rememberMe": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["emailVerified"], true);
    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    // me
    let (status, body) = app.get("/auth/me", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["emailVerified"], true);
    assert!(body["emailVerifiedAt"].is_string());

    // refresh
    let (status, body) = app
        .post_json("/auth/refresh", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["access_token"].as_str().unwrap().to_string();
    let (status, _) = app.get("/auth/me", Some(&new_access)).await;
    assert_eq!(status, StatusCode::OK);

    // logout
    let (status, body) = app
        .send(json_request(Method::POST, "/auth/logout", &json!({}), Some(&access)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = setup_test_app();
    let payload = json!({ "email": "ada@example.com", "password": "secret1" });

    let (status, _) = app.post_json("/auth/register", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post_json(
            "/auth/register",
            json!({ "email": "ADA@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT_001");
    assert_eq!(body["error"]["message"], "User with this email already exists");
    assert_eq!(app.storage.user_count(), 1);
}

#[tokio::test]
async fn test_invalid_registration_is_rejected() {
    let app = setup_test_app();

    let (status, body) = app
        .post_json("/auth/register", json!({ "email": "nope", "password": "abc" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Please provide a valid email address"));
    assert!(message.contains("Password must be at least 6 characters long"));
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = setup_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\":"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
}

#[tokio::test]
async fn test_registration_rolls_back_when_mail_fails() {
    let app = setup_test_app();
    app.mailer.set_failing(true);

    let (status, body) = app
        .post_json(
            "/auth/register",
            json!({ "email": "ada@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Registration failed. Please try again.");
    assert_eq!(app.storage.user_count(), 0);
    assert!(app.storage.verification_tokens().is_empty());

    // the address can be registered once mail works again
    app.mailer.set_failing(false);
    let (status, _) = app
        .post_json(
            "/auth/register",
            json!({ "email": "ada@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_wrong_password_and_lockout() {
    let app = setup_test_app();
    app.registered_and_verified("ada@example.com", "secret1").await;

    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "nobody@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid email or password");

    for _ in 0..4 {
        let (status, body) = app
            .post_json(
                "/auth/login",
                json!({ "email": "ada@example.com", "password": "wrong-password" }),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_002");
    }

    // five failures lock the client out, even with the right password
    let (status, body) = app
        .post_json(
            "/auth/login",
            json!({ "email": "ada@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "AUTH_003");
}

#[tokio::test]
async fn test_token_kinds_are_not_interchangeable() {
    let app = setup_test_app();
    let login = app.registered_and_verified("ada@example.com", "secret1").await;
    let access = login["access_token"].as_str().unwrap();
    let refresh = login["refresh_token"].as_str().unwrap();

    let (status, body) = app.get("/auth/me", Some(refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_001");

    let (status, body) = app
        .post_json("/auth/refresh", json!({ "refresh_token": access }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_005");

    let (status, body) = app
        .post_json("/auth/refresh", json!({ "refresh_token": "garbage" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_protected_routes_require_a_bearer_token() {
    let app = setup_test_app();

    let (status, body) = app.get("/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_001");

    let (status, _) = app
        .send(json_request(Method::POST, "/auth/logout", &json!({}), None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_deleted_user() {
    let app = setup_test_app();
    let login = app.registered_and_verified("ada@example.com", "secret1").await;
    let access = login["access_token"].as_str().unwrap();
    let id = login["user"]["id"].as_str().unwrap().parse().unwrap();

    app.storage.delete_user(id).await.unwrap();

    let (status, body) = app.get("/auth/me", Some(access)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "User not found");
}

#[tokio::test]
async fn test_verification_failures_are_reported_in_band() {
    let app = setup_test_app();

    let (status, body) = app.get("/auth/verify-email/not-a-real-token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid verification token");
}

#[tokio::test]
async fn test_resend_verification() {
    let app = setup_test_app();

    let (status, body) = app
        .post_json(
            "/auth/resend-verification",
            json!({ "email": "nobody@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User not found");

    let (status, body) = app
        .post_json("/auth/resend-verification", json!({ "email": "" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email is required");

    app.post_json(
        "/auth/register",
        json!({ "email": "ada@example.com", "password": "secret1" }),
    )
    .await;
    let first = app.verification_token_for("ada@example.com");

    // lookups are case-insensitive
    let (status, body) = app
        .post_json(
            "/auth/resend-verification",
            json!({ "email": "Ada@Example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.mailer.sent().len(), 2);

    let second = app.verification_token_for("ada@example.com");
    assert_ne!(first, second);

    let (_, body) = app.get(&format!("/auth/verify-email/{first}"), None).await;
    assert_eq!(body["success"], false);
    let (_, body) = app.get(&format!("/auth/verify-email/{second}"), None).await;
    assert_eq!(body["success"], true);

    let (_, body) = app
        .post_json(
            "/auth/resend-verification",
            json!({ "email": "ada@example.com" }),
        )
        .await;
    assert_eq!(body["message"], "Email is already verified");
}

#[tokio::test]
async fn test_cors_mirrors_origin() {
    let app = setup_test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/auth/login")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cleanup_keeps_unexpired_tokens() {
    let app = setup_test_app();
    app.post_json(
        "/auth/register",
        json!({ "email": "ada@example.com", "password": "secret1" }),
    )
    .await;
    assert_eq!(app.storage.verification_tokens().len(), 1);

    assert_eq!(app.state.verifier.cleanup_expired_tokens().await, 0);
    assert_eq!(app.storage.verification_tokens().len(), 1);
}

#[tokio::test]
async fn test_refresh_input_edge_cases() {
    let app = setup_test_app();

    for body in [json!({ "refresh_token": "   " }), json!({})] {
        let (status, body) = app.post_json("/auth/refresh", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Refresh token is required");
    }

    let login = app.registered_and_verified("ada@example.com", "secret1").await;
    let refresh = login["refresh_token"].as_str().unwrap();
    let id = login["user"]["id"].as_str().unwrap().parse().unwrap();
    app.storage.delete_user(id).await.unwrap();

    let (status, body) = app
        .post_json("/auth/refresh", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_005");
    assert_eq!(body["error"]["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_blank_verification_token_is_a_bad_request() {
    let app = setup_test_app();

    let (status, body) = app.get("/auth/verify-email/%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VAL_001");
    assert_eq!(body["error"]["message"], "Verification token is required");
}

#[tokio::test]
async fn test_expired_verification_token_over_http() {
    let app = setup_test_app();
    let user = app
        .storage
        .create_user(NewUser {
            email: "ada@example.com".to_string(),
            name: None,
            password_hash: None,
        })
        .await
        .unwrap();
    app.storage
        .create_verification_token(NewVerificationToken {
            token: "stale-token".to_string(),
            email: user.email.clone(),
            user_id: user.id,
            expires_at: Utc::now() - Duration::minutes(1),
        })
        .await
        .unwrap();

    let (status, body) = app.get("/auth/verify-email/stale-token", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Verification token has expired");
    assert!(app.storage.verification_tokens().is_empty());

    let user = app.storage.find_user_by_id(user.id).await.unwrap().unwrap();
    assert!(!user.email_verified);
}

#[tokio::test]
async fn test_storage_outage_maps_to_client_errors() {
    let app = setup_test_app();
    let login = app.registered_and_verified("ada@example.com", "secret1").await;
    let refresh = login["refresh_token"].as_str().unwrap();

    app.storage.set_unavailable(true);

    let (status, body) = app
        .post_json(
            "/auth/register",
            json!({ "email": "grace@example.com", "password": "secret1" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Registration failed. Please try again.");

    let (status, body) = app
        .post_json("/auth/refresh", json!({ "refresh_token": refresh }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid refresh token");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unreachable");
}
