use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use log::warn;
use thiserror::Error;

use crate::llm::LlmError;
use crate::models::api::ErrorResponse;

pub const MISSING_QUESTION: &str = "question is required";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("question is required")]
    MissingQuestion,

    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("too many requests")]
    RateLimited,

    #[error(transparent)]
    Generation(#[from] LlmError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingQuestion => {
                warn!("Rejected request: {}", MISSING_QUESTION);
                (StatusCode::BAD_REQUEST, ErrorResponse {
                    error: Some(MISSING_QUESTION.to_string()),
                    details: None,
                })
            }
            ApiError::InvalidBody(details) => {
                warn!("Rejected request body: {}", details);
                (StatusCode::BAD_REQUEST, ErrorResponse {
                    error: Some("invalid request body".to_string()),
                    details: Some(details),
                })
            }
            ApiError::RateLimited => {
                warn!("Rate limit exceeded for /api/ask");
                (StatusCode::TOO_MANY_REQUESTS, ErrorResponse {
                    error: Some("too many requests".to_string()),
                    details: None,
                })
            }
            ApiError::Generation(err) => {
                let kind = err.kind();
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse {
                    error: Some(kind.user_message().to_string()),
                    details: Some(err.to_string()),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}
