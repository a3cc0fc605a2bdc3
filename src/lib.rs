//! AYA Portal API
//!
//! Backend of the client portal: dispatch and loss records, purchase records
//! with their dashboard, portal sign-in and course progress.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod normalize;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, patch, post},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
    ) -> Result<Self, errors::ServiceError> {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = handlers::AppServices::new(db.clone(), &config)?;
        Ok(Self {
            db,
            config,
            auth,
            services,
        })
    }
}

/// Routes mounted under `/api`. Everything except login needs a bearer token.
pub fn api_routes() -> Router<AppState> {
    let public = Router::new().route("/auth/login", post(handlers::auth::login));

    let records = Router::new()
        .route(
            "/records",
            get(handlers::records::list_records).post(handlers::records::create_record),
        )
        .route(
            "/records/:id",
            patch(handlers::records::update_record).delete(handlers::records::delete_record),
        );

    let financial = Router::new()
        .route(
            "/financial",
            get(handlers::financial::list_compras).post(handlers::financial::create_compra),
        )
        .route("/financial/dashboard", get(handlers::financial::dashboard))
        .route(
            "/financial/:id",
            patch(handlers::financial::update_compra).delete(handlers::financial::delete_compra),
        );

    let account = Router::new()
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/progress/mark", post(handlers::progress::mark_progress))
        .route("/progress/reset", post(handlers::progress::reset_progress))
        .route("/courses/catalog", get(handlers::courses::catalog));

    public.merge(records.merge(financial).merge(account).with_auth())
}

/// Full application router without transport layers (tracing, CORS,
/// compression); `main` adds those.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::liveness_check))
        .route("/status", get(handlers::health::status_check))
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .layer(Extension(state.auth.clone()))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}
