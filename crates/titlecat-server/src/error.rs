use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use titlecat_ai::ModelError;
use titlecat_core::ErrorBody;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("No title provided")]
    MissingTitle,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A body the JSON extractor refused for reasons other than its content.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Prediction failed: {0}")]
    Pipeline(#[from] ModelError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingTitle | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected { status, .. } => *status,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Pipeline(_) | Self::Internal(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "MISSING_TITLE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Rejected { status, .. } => match *status {
                StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
                StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
                s if s.is_server_error() => "INTERNAL_ERROR",
                _ => "BAD_REQUEST",
            },
            Self::Pipeline(_) => "PREDICTION_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code: self.error_code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
