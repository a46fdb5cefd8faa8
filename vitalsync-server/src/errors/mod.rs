pub mod api;
pub mod broadcast;
pub mod patient;

pub use api::ApiError;
pub use broadcast::BroadcastError;
pub use patient::PatientError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Extract status code and error message from the specific error type
        let (status, error_message, error_id) = match self {
            ApiError::PatientError(e) => (e.status_code(), e.to_string(), None),
            ApiError::PathRejection(e) => (e.status(), e.body_text(), None),
            ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Some(error_id))
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), Some(error_id))
            }
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        // Internal failures carry an id that matches the log line
        if let Some(error_id) = error_id {
            error_obj["error_id"] = json!(error_id.to_string());
        }

        (status, Json(json!({ "error": error_obj }))).into_response()
    }
}
