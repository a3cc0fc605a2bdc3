use crate::{
    entities::compra,
    errors::ServiceError,
    handlers::common::{created_response, json_body, query_params, success_response, OkResponse},
    services::financial::{DashboardSummary, FinancialListParams},
    AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    response::Response,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct CompraRowsResponse {
    pub rows: Vec<compra::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompraRowResponse {
    pub ok: bool,
    pub row: compra::Model,
}

#[utoipa::path(
    get,
    path = "/api/financial",
    params(FinancialListParams),
    responses(
        (status = 200, description = "Compras listed", body = CompraRowsResponse),
        (status = 400, description = "Store error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "financial"
)]
pub async fn list_compras(
    State(state): State<AppState>,
    query: Result<Query<FinancialListParams>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let params = query_params(query)?;
    let rows = state.services.financial.list(&params).await?;
    Ok(success_response(CompraRowsResponse { rows }))
}

#[utoipa::path(
    post,
    path = "/api/financial",
    request_body(content = Object, description = "`cliente`, `valor` and `forma_de_pag` are required; statuses are ignored"),
    responses(
        (status = 201, description = "Compra created with pending statuses", body = CompraRowResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "financial"
)]
pub async fn create_compra(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let body = json_body(payload)?;
    let row = state.services.financial.create(&body).await?;
    Ok(created_response(CompraRowResponse { ok: true, row }))
}

#[utoipa::path(
    patch,
    path = "/api/financial/{id}",
    params(("id" = String, Path, description = "Compra UUID")),
    request_body(content = Object, description = "Any of `status_cliente`, `status_aya`, `nota_fiscal`"),
    responses(
        (status = 200, description = "Compra updated", body = CompraRowResponse),
        (status = 400, description = "Invalid id, status or empty patch", body = crate::errors::ErrorResponse),
        (status = 404, description = "Compra not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "financial"
)]
pub async fn update_compra(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let body = json_body(payload)?;
    let row = state.services.financial.patch(&id, &body).await?;
    Ok(success_response(CompraRowResponse { ok: true, row }))
}

#[utoipa::path(
    delete,
    path = "/api/financial/{id}",
    params(("id" = String, Path, description = "Compra UUID")),
    responses(
        (status = 200, description = "Compra deleted", body = OkResponse),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "financial"
)]
pub async fn delete_compra(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    state.services.financial.delete(&id).await?;
    Ok(success_response(OkResponse::ok()))
}

#[utoipa::path(
    get,
    path = "/api/financial/dashboard",
    responses(
        (status = 200, description = "Dashboard totals over every compra", body = DashboardSummary),
        (status = 400, description = "Store error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "financial"
)]
pub async fn dashboard(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let summary = state.services.financial.dashboard().await?;
    Ok(success_response(summary))
}
