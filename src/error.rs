use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

/// A guard violation in the application lifecycle. These are caller
/// errors: the operation is aborted with no partial state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("You have already applied to this job")]
    DuplicateApplication,

    #[error("You cannot apply to your own job")]
    InvalidApplicant,

    #[error("This job is no longer open")]
    JobClosed,

    #[error("Only the job owner can decide on applications")]
    NotOwner,

    #[error("This application has already been decided")]
    AlreadyDecided,

    #[error("Only the applicant can withdraw an application")]
    NotApplicant,
}

/// The sub-steps of the hire transition, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HireStep {
    AcceptApplication,
    RejectSiblings,
    CloseJob,
}

impl HireStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            HireStep::AcceptApplication => "accept_application",
            HireStep::RejectSiblings => "reject_siblings",
            HireStep::CloseJob => "close_job",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// One of the hire sub-steps failed after earlier steps succeeded.
    /// Every step is idempotent, so the caller may retry the whole
    /// transition; the failed step is named so the client can report it.
    #[error("Hire interrupted at step '{}': {source}", .step.as_str())]
    HireInterrupted {
        step: HireStep,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            Error::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Workflow(err) => (workflow_status(&err), err.to_string()),
            Error::HireInterrupted { step, source } => {
                let body = Json(json!({
                    "error": "hire_interrupted",
                    "failed_step": step.as_str(),
                    "detail": source.to_string(),
                    "retryable": true,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Error::Io(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected error occurred".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::DuplicateApplication => StatusCode::CONFLICT,
        WorkflowError::InvalidApplicant => StatusCode::BAD_REQUEST,
        WorkflowError::JobClosed => StatusCode::CONFLICT,
        WorkflowError::NotOwner => StatusCode::FORBIDDEN,
        WorkflowError::AlreadyDecided => StatusCode::CONFLICT,
        WorkflowError::NotApplicant => StatusCode::FORBIDDEN,
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
