#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use aya_portal_api::{
    auth::hash_password,
    build_router,
    config::AppConfig,
    db::{self, DbConfig},
    entities::usuario,
    AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_LOGIN: &str = "operador";
pub const TEST_PASSWORD: &str = "senha-legada";

/// Helper harness backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub user_id: Uuid,
    token: String,
}

impl TestApp {
    /// Fresh schema plus one portal user whose password is still stored in
    /// plaintext, as rows imported from the old portal are.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let pool = db::establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg).expect("application state for tests");
        let router = build_router(state.clone());

        let user_id = seed_user(&state, TEST_LOGIN, TEST_PASSWORD, json!(["financeiro"])).await;

        let mut app = Self {
            router,
            state,
            user_id,
            token: String::new(),
        };
        app.token = app.login(TEST_LOGIN, TEST_PASSWORD).await;
        app
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Logs in and returns the bearer token, panicking on failure.
    pub async fn login(&self, login: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                Some(json!({ "login": login, "password": password })),
                None,
            )
            .await;
        assert_eq!(response.status(), 200, "login should succeed in test setup");
        let body = response_json(response).await;
        body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    /// Sends `body` verbatim as `application/json` with the test token.
    pub async fn request_raw(&self, method: Method, uri: &str, body: &'static str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("valid request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router response")
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(&self.token)).await
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::new(
        "sqlite::memory:".to_string(),
        "test_secret_key_for_portal_tokens_only_32chars".to_string(),
        3600,
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    )
}

/// Inserts a user with the given stored password value, verbatim.
pub async fn seed_user(state: &AppState, login: &str, senha: &str, acessos: Value) -> Uuid {
    let model = usuario::ActiveModel {
        id: Set(Uuid::new_v4()),
        login: Set(login.to_string()),
        senha: Set(senha.to_string()),
        nome: Set(Some("Operador de Teste".to_string())),
        acessos: Set(acessos),
        progresso: Set(json!([])),
        ..Default::default()
    };
    let user = model.insert(&*state.db).await.expect("seed portal user");
    user.id
}

/// Same as [`seed_user`] with an argon2 hash of `password`.
pub async fn seed_hashed_user(state: &AppState, login: &str, password: &str) -> Uuid {
    let hash = hash_password(password).expect("hash test password");
    seed_user(state, login, &hash, json!([])).await
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
