use crate::{
    auth::AuthUser,
    entities::usuario,
    errors::ServiceError,
    handlers::common::{json_body, success_response, validate_input, OkResponse},
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
use uuid::Uuid;
use validator::Validate;

/// Login request payload
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({"login": "operador", "password": "********"}))]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub login: String,
    pub nome: Option<String>,
}

impl From<&usuario::Model> for UserProfile {
    fn from(user: &usuario::Model) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            nome: user.nome.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    /// Bearer token for every other `/api` route
    pub token: String,
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserProfile,
    /// Dashboard grants, as stored
    #[schema(value_type = Object)]
    pub acessos: Value,
    /// Completed lesson ids
    pub progresso: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 6, max = 128))]
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 400, description = "Malformed body", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = json_body(payload)?;
    let user = state
        .services
        .users
        .authenticate(&request.login, &request.password)
        .await?;
    let token = state.auth.generate_token(&user)?;

    Ok(success_response(LoginResponse {
        ok: true,
        token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        user: UserProfile::from(&user),
        progresso: user.lessons(),
        acessos: user.acessos,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = OkResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Wrong current password or missing token", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = json_body(payload)?;
    validate_input(&request)?;

    state
        .services
        .users
        .change_password(caller.user_id, &request.old_password, &request.new_password)
        .await?;
    Ok(success_response(OkResponse::ok()))
}
