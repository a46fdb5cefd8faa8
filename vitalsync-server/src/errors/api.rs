use axum::extract::rejection::PathRejection;

use super::PatientError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Patient error: {0}")]
    PatientError(#[from] PatientError),

    #[error("Path rejection: {0}")]
    PathRejection(#[from] PathRejection),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
