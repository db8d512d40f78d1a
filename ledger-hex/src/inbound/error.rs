//! Mapping of service errors onto HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use ledger_types::{AppError, ErrorKind, ErrorResponse};

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request failed validation before reaching a service.
    BadRequest(String),
    /// The request body exceeded the configured limit.
    PayloadTooLarge(String),
    App(AppError),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Stable code and status for each domain error kind.
fn classify(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "notFound"),
        ErrorKind::Duplicate => (StatusCode::CONFLICT, "duplicate"),
        ErrorKind::InvalidOperationType => (StatusCode::BAD_REQUEST, "invalidOperationType"),
        ErrorKind::InvalidAmount => (StatusCode::BAD_REQUEST, "invalidAmount"),
    }
}

/// The opaque 500 body. The cause is only logged.
pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "internal server error" })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("badRequest", message)),
            )
                .into_response(),
            ApiError::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorResponse::new("payloadTooLarge", message)),
            )
                .into_response(),
            ApiError::App(err) => match err.kind() {
                Some(kind) => {
                    let (status, code) = classify(kind);
                    (status, Json(ErrorResponse::new(code, err.to_string()))).into_response()
                }
                None => {
                    tracing::error!(error = ?err, "request failed");
                    internal_error()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use ledger_types::{DomainError, RepoError};

    use super::*;

    #[test]
    fn test_status_for_each_kind() {
        let cases = [
            (DomainError::not_found("account 1"), StatusCode::NOT_FOUND),
            (DomainError::duplicate("document number 1"), StatusCode::CONFLICT),
            (DomainError::invalid_operation_type("operation type unknown"), StatusCode::BAD_REQUEST),
            (DomainError::invalid_amount("amount 0"), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            let response = ApiError::from(AppError::from(err)).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_opaque_errors_are_internal() {
        let storage = ApiError::from(AppError::from(RepoError::Database("boom".into())));
        assert_eq!(storage.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let cancelled = ApiError::from(AppError::Cancelled("deadline".into()));
        assert_eq!(cancelled.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_bad_request_status() {
        let response = ApiError::BadRequest("document_number is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
