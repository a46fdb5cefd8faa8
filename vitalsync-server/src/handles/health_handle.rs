use axum::routing::get;
use axum::{Json, Router};
use vitalsync_api::HealthStatus;

pub fn health_router() -> Router {
    Router::new().route("/health", get(get_health))
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    )
)]
pub async fn get_health() -> Json<HealthStatus> {
    Json(HealthStatus { ok: true })
}
