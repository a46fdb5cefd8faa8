use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;
use vitalsync_api::*;

use super::health_handle::__path_get_health;
use super::patient_handle::{__path_get_patient_summary, __path_get_patients, __path_get_summaries};
use super::stream_handle::{__path_sse_handler, __path_ws_handler};

#[derive(OpenApi)]
#[openapi(
    info(title = "VitalSync", description = "Simulated patient vitals over REST, WebSocket and SSE"),
    paths(
        get_patients,
        get_summaries,
        get_patient_summary,
        get_health,
        ws_handler,
        sse_handler
    ),
    components(schemas(
        PatientSnapshot,
        DeviceSnapshot,
        DeviceCategory,
        AlertLevel,
        ReadingPoint,
        HealthStatus,
        HealthSummaryResponse,
        LatestSummary,
        SummarySource
    )),
    tags(
        (name = "patient", description = "Patient snapshots and summaries"),
        (name = "health", description = "Liveness"),
        (name = "stream", description = "Live snapshot streams")
    )
)]
pub struct ApiDoc;

pub fn docs_router() -> Router {
    Router::new().route("/api/openapi.json", get(get_openapi))
}

async fn get_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
