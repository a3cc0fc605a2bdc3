use crate::{
    auth::AuthUser,
    errors::ServiceError,
    handlers::common::{json_body, success_response},
    normalize::clean_text,
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"lesson_id": "modulo-1-aula-3"}))]
pub struct MarkProgressRequest {
    /// Lesson identifier; numbers are accepted and stored as text
    #[schema(value_type = String)]
    pub lesson_id: Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProgressResponse {
    pub ok: bool,
    pub progresso: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/progress/mark",
    request_body = MarkProgressRequest,
    responses(
        (status = 200, description = "Lesson recorded", body = ProgressResponse),
        (status = 400, description = "Missing lesson id", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "progress"
)]
pub async fn mark_progress(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<MarkProgressRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = json_body(payload)?;
    let lesson_id = clean_text(Some(&request.lesson_id))
        .ok_or_else(|| ServiceError::validation("lesson_id é obrigatório"))?;

    let progresso = state
        .services
        .users
        .mark_progress(caller.user_id, &lesson_id)
        .await?;
    Ok(success_response(ProgressResponse { ok: true, progresso }))
}

#[utoipa::path(
    post,
    path = "/api/progress/reset",
    responses(
        (status = 200, description = "Progress cleared", body = ProgressResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "progress"
)]
pub async fn reset_progress(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Response, ServiceError> {
    let progresso = state.services.users.reset_progress(caller.user_id).await?;
    Ok(success_response(ProgressResponse { ok: true, progresso }))
}
