//! Server errors and the mapping from pipeline failures to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use meditate_rs_core::{MeditationError, PipelineFailure, StoreError};
use meditate_rs_protocol::{ApiErrorBody, ErrorKind};
use thiserror::Error;

const RUNTIME_MESSAGE: &str = "There was a problem with the meditation generation service.";
const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again later.";
const UNEXPECTED_MESSAGE: &str =
    "Our servers encountered an issue while generating your meditation.";

/// Failures starting or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Request-level failure rendered as a JSON error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No data received. Please provide meditation parameters.")]
    NoData,
    #[error("Meditation not found")]
    NotFound,
    #[error(transparent)]
    Meditation(#[from] MeditationError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("database reset failed: {0}")]
    Reset(StoreError),
}

impl From<PipelineFailure> for ApiError {
    fn from(failure: PipelineFailure) -> Self {
        ApiError::Meditation(failure.error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoData => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Meditation(err) if err.kind().is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Meditation(_) | ApiError::Store(_) | ApiError::Reset(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Caller-facing body; internal details stay in the logs.
    pub fn body(&self) -> ApiErrorBody {
        match self {
            ApiError::NoData | ApiError::NotFound => ApiErrorBody::message(self.to_string()),
            ApiError::Meditation(err) => meditation_body(err),
            ApiError::Store(_) => unexpected_body(),
            ApiError::Reset(err) => {
                ApiErrorBody::message(format!("Error resetting database: {err}"))
            }
        }
    }
}

fn meditation_body(err: &MeditationError) -> ApiErrorBody {
    let kind = err.kind();
    match kind {
        ErrorKind::ValidationFailed => ApiErrorBody {
            error: err.to_string(),
            validation_errors: err.validation_errors().map(<[String]>::to_vec),
            ..ApiErrorBody::default()
        },
        ErrorKind::InputFormat => ApiErrorBody::message(err.to_string()),
        ErrorKind::ConfigurationError => ApiErrorBody {
            error: err.to_string(),
            error_type: kind.error_type().map(str::to_string),
            ..ApiErrorBody::default()
        },
        ErrorKind::UnexpectedError => unexpected_body(),
        ErrorKind::ProviderOverloaded
        | ErrorKind::ProviderTimeout
        | ErrorKind::ProviderUnreachable
        | ErrorKind::RequestTooComplex
        | ErrorKind::ProviderError => ApiErrorBody {
            error: err.to_string(),
            error_type: kind.error_type().map(str::to_string),
            message: Some(RUNTIME_MESSAGE.to_string()),
            validation_errors: None,
        },
    }
}

fn unexpected_body() -> ApiErrorBody {
    ApiErrorBody {
        error: UNEXPECTED_ERROR.to_string(),
        error_type: ErrorKind::UnexpectedError.error_type().map(str::to_string),
        message: Some(UNEXPECTED_MESSAGE.to_string()),
        validation_errors: None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
