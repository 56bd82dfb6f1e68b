use actix_web::http::StatusCode;
use actix_web::{error, HttpRequest, HttpResponse, ResponseError};

use crate::core::SwipeError;
use crate::models::ErrorResponse;
use crate::services::StoreError;

fn json_error(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

impl ResponseError for SwipeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SwipeError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SwipeError::NotFound(_) => StatusCode::NOT_FOUND,
            SwipeError::Storage(e) => e.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            SwipeError::InvalidArgument(msg) => {
                json_error(self.status_code(), "Invalid argument", msg.clone())
            }
            SwipeError::NotFound(msg) => json_error(self.status_code(), "User not found", msg.clone()),
            SwipeError::Storage(e) => e.error_response(),
        }
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Conflict(_) => StatusCode::CONFLICT,
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Storage failure: {}", self);
            return json_error(status, "Storage error", "Internal storage failure".to_string());
        }
        let error = match self {
            StoreError::InvalidInput(_) => "Invalid argument",
            StoreError::NotFound(_) => "Not found",
            _ => "Storage error",
        };
        json_error(status, error, self.to_string())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = json_error(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err));
    error::InternalError::from_response(err, response).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let response = json_error(StatusCode::BAD_REQUEST, "invalid_query", format!("Invalid query: {}", err));
    error::InternalError::from_response(err, response).into()
}
