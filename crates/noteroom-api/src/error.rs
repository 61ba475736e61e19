//! HTTP error mapping.
//!
//! Every API error surfaces as a `{"message": "..."}` JSON body: validation
//! failures map to 400, unknown note ids to 404, store failures to 500.

use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug)]
pub enum ApiError {
    Database(noteroom_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<noteroom_core::Error> for ApiError {
    fn from(err: noteroom_core::Error) -> Self {
        match err {
            noteroom_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            noteroom_core::Error::NoteNotFound(id) => {
                ApiError::NotFound(format!("Note {} not found", id))
            }
            noteroom_core::Error::Validation(msg) => ApiError::BadRequest(msg),
            other => ApiError::Database(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(error = %err, "store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "message": message,
        }));

        (status, body).into_response()
    }
}
