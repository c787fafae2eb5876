use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chat_core::ChatError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Chat(ChatError::Validation(_)) => "validation_error",
            AppError::Chat(ChatError::Configuration(_)) => "configuration_error",
            AppError::Chat(ChatError::Timeout) => "timeout_error",
            AppError::Chat(ChatError::Upstream { .. }) => "upstream_error",
            AppError::Chat(ChatError::StreamTransport(_)) => "stream_error",
            AppError::Internal(_) => "api_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Chat(ChatError::Validation(_)) => StatusCode::BAD_REQUEST,
            AppError::Chat(ChatError::Configuration(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Chat(ChatError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Chat(ChatError::Upstream { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Chat(ChatError::StreamTransport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_response = JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        HttpResponse::build(status_code).json(error_response)
    }
}
