use crate::{
    errors::ServiceError,
    handlers::common::{
        created_response, json_body, query_params, success_response, ModeQuery, OkResponse,
    },
    services::records::{RecordListParams, RecordMode, RecordRow},
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
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordRowsResponse {
    pub rows: Vec<RecordRow>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordCreatedResponse {
    pub ok: bool,
    pub id: Uuid,
}

#[utoipa::path(
    get,
    path = "/api/records",
    params(RecordListParams),
    responses(
        (status = 200, description = "Records listed", body = RecordRowsResponse),
        (status = 400, description = "Missing date range, bad mode or store error", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "records"
)]
pub async fn list_records(
    State(state): State<AppState>,
    query: Result<Query<RecordListParams>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let params = query_params(query)?;
    let mode = RecordMode::resolve(params.mode.as_deref())?;
    let rows = state.services.records.list(mode, &params).await?;
    Ok(success_response(RecordRowsResponse { rows }))
}

#[utoipa::path(
    post,
    path = "/api/records",
    request_body(content = Object, description = "`mode` plus record fields; `data` and `usina` are required"),
    responses(
        (status = 201, description = "Record created", body = RecordCreatedResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "records"
)]
pub async fn create_record(
    State(state): State<AppState>,
    query: Result<Query<ModeQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let query = query_params(query)?;
    let body = json_body(payload)?;
    let mode = RecordMode::resolve(
        body.get("mode")
            .and_then(Value::as_str)
            .or(query.mode.as_deref()),
    )?;

    let id = state.services.records.create(mode, &body).await?;
    Ok(created_response(RecordCreatedResponse { ok: true, id }))
}

#[utoipa::path(
    patch,
    path = "/api/records/{id}",
    params(
        ("id" = String, Path, description = "Record UUID"),
        ModeQuery
    ),
    request_body(content = Object, description = "Partial record; only supplied keys are written"),
    responses(
        (status = 200, description = "Record updated", body = OkResponse),
        (status = 400, description = "Invalid id or empty patch", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "records"
)]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<ModeQuery>, QueryRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let query = query_params(query)?;
    let mode = RecordMode::resolve(query.mode.as_deref())?;
    let body = json_body(payload)?;

    state.services.records.patch(mode, &id, &body).await?;
    Ok(success_response(OkResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/records/{id}",
    params(
        ("id" = String, Path, description = "Record UUID"),
        ModeQuery
    ),
    responses(
        (status = 200, description = "Record deleted", body = OkResponse),
        (status = 400, description = "Invalid id", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "records"
)]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<ModeQuery>, QueryRejection>,
) -> Result<Response, ServiceError> {
    let query = query_params(query)?;
    let mode = RecordMode::resolve(query.mode.as_deref())?;

    state.services.records.delete(mode, &id).await?;
    Ok(success_response(OkResponse::ok()))
}
