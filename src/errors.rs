use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{0}")] Input(String),
    #[error("{0}")] Config(String),
    #[error("LLM call failed: {0}")] Provider(String),
    #[error("persistence error: {0}")] Persistence(#[from] std::io::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Input(_) => StatusCode::BAD_REQUEST,
            RelayError::Config(_) | RelayError::Provider(_) | RelayError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
