use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("No summary has been generated for this patient yet")]
    SummaryNotFound,
}

impl PatientError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PatientError::PatientNotFound => StatusCode::NOT_FOUND,
            PatientError::SummaryNotFound => StatusCode::NOT_FOUND,
        }
    }
}
