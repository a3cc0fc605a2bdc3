//! Sign-in, password change and course progress.

mod common;

use assert_matches::assert_matches;
use aya_portal_api::{
    auth::{verify_password, PasswordCheck},
    entities::usuario,
};
use axum::http::{Method, StatusCode};
use common::{response_json, seed_hashed_user, TestApp, TEST_LOGIN, TEST_PASSWORD};
use sea_orm::EntityTrait;
use serde_json::json;

async fn stored_password(app: &TestApp) -> String {
    usuario::Entity::find_by_id(app.user_id)
        .one(&*app.state.db)
        .await
        .expect("query user")
        .expect("user exists")
        .senha
}

#[tokio::test]
async fn login_returns_token_profile_and_grants() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "login": TEST_LOGIN, "password": TEST_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    assert_eq!(body["ok"], true);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["login"], TEST_LOGIN);
    assert_eq!(body["user"]["id"], app.user_id.to_string());
    assert_eq!(body["acessos"], json!(["financeiro"]));
    assert_eq!(body["progresso"], json!([]));
    assert!(body["user"].get("senha").is_none());
}

#[tokio::test]
async fn legacy_plaintext_password_is_upgraded_on_login() {
    let app = TestApp::new().await;

    // TestApp::new already logged in once with the plaintext value
    let stored = stored_password(&app).await;
    assert!(stored.starts_with("$argon2"));
    assert_matches!(
        verify_password(&stored, TEST_PASSWORD),
        Ok(PasswordCheck::Valid)
    );

    // and the upgraded hash still accepts the same password
    app.login(TEST_LOGIN, TEST_PASSWORD).await;
}

#[tokio::test]
async fn wrong_or_unknown_credentials_are_unauthorized() {
    let app = TestApp::new().await;
    seed_hashed_user(&app.state, "gestor", "s3nha-forte").await;

    for (login, password) in [
        (TEST_LOGIN, "errada"),
        ("gestor", "S3NHA-FORTE"),
        ("ninguem", "qualquer"),
        ("", ""),
    ] {
        let response = app
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "login": login, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{login}");
    }

    app.login("gestor", "s3nha-forte").await;
}

#[tokio::test]
async fn login_with_malformed_body_is_a_bad_request() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "login": TEST_LOGIN })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_requires_the_current_one() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/auth/change-password",
            Some(json!({ "old_password": "errada", "new_password": "nova-senha" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/auth/change-password",
            Some(json!({ "old_password": TEST_PASSWORD, "new_password": "123" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/auth/change-password",
            Some(json!({ "old_password": TEST_PASSWORD, "new_password": "nova-senha" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await, json!({ "ok": true }));

    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "login": TEST_LOGIN, "password": TEST_PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    app.login(TEST_LOGIN, "nova-senha").await;
}

#[tokio::test]
async fn change_password_needs_a_token() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/auth/change-password",
            Some(json!({ "old_password": TEST_PASSWORD, "new_password": "nova-senha" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn marking_lessons_is_idempotent_and_reset_clears() {
    let app = TestApp::new().await;

    for lesson in [json!("modulo-1-aula-1"), json!(7), json!(" modulo-1-aula-1 ")] {
        let response = app
            .request_authenticated(
                Method::POST,
                "/api/progress/mark",
                Some(json!({ "lesson_id": lesson })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/progress/mark",
            Some(json!({ "lesson_id": "modulo-2-aula-1" })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(
        body["progresso"],
        json!(["modulo-1-aula-1", "7", "modulo-2-aula-1"])
    );

    // progress comes back with the next login
    let response = app
        .request(
            Method::POST,
            "/api/auth/login",
            Some(json!({ "login": TEST_LOGIN, "password": TEST_PASSWORD })),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["progresso"].as_array().unwrap().len(), 3);

    let response = app
        .request_authenticated(Method::POST, "/api/progress/reset", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response_json(response).await,
        json!({ "ok": true, "progresso": [] })
    );
}

#[tokio::test]
async fn blank_lesson_id_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/progress/mark",
            Some(json!({ "lesson_id": "  " })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_answer_without_a_token() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/status", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["database"]["status"], "up");
    assert_eq!(body["video_platform_configured"], false);
}
