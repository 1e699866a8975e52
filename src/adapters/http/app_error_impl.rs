use crate::app_error::AppError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        // Server-side failures all surface the same generic message so no
        // backend details leak to the caller.
        match self {
            AppError::InvalidInput(msg) => error_resp(StatusCode::BAD_REQUEST, &msg),
            AppError::Unauthorized => error_resp(StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::BackendUnavailable | AppError::Database(_) | AppError::Internal(_) => {
                error_resp(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong, please try again.",
                )
            }
        }
    }
}

fn error_resp(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
