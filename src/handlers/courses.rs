use crate::{
    errors::ServiceError, handlers::common::success_response,
    services::video_catalog::VideoCatalog, AppState,
};
use axum::{extract::State, response::Response};

#[utoipa::path(
    get,
    path = "/api/courses/catalog",
    responses(
        (status = 200, description = "Aggregated video listing; failed pages are omitted", body = VideoCatalog),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 502, description = "Video platform unavailable", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "courses"
)]
pub async fn catalog(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let catalog = state.services.video_catalog.catalog().await?;
    Ok(success_response(catalog))
}
