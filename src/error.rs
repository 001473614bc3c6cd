use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid output format specified ({0})")]
    UnsupportedFormat(String),

    #[error("went over content byte limit ({0} bytes)")]
    PayloadTooLarge(usize),

    #[error("malformed lookup output: {0}")]
    UpstreamParse(String),

    #[error("upstream command failed: {0}")]
    Upstream(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: &'static str,
    pub message: String,
}

impl Error {
    /// True when the request itself was at fault, as opposed to the
    /// lookup tooling behind it.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::UnsupportedFormat(_))
    }

    fn error_type(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "InvalidInput",
            Error::UnsupportedFormat(_) => "UnsupportedFormat",
            Error::PayloadTooLarge(_) => "PayloadTooLarge",
            Error::UpstreamParse(_) => "UpstreamParseError",
            Error::Upstream(_) => "UpstreamError",
            Error::Io(_) | Error::Internal(_) => "InternalError",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::UpstreamParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Io(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorBody {
                r#type: self.error_type(),
                message: self.to_string(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}
