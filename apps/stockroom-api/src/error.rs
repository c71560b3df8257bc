//! Error types for the HTTP API.
//!
//! ```text
//! ValidationError ─► CoreError ─► DbError ─► ApiError ─► HTTP response
//!                                                │
//!                         Validation  → 422 {"errors": {field: [msg]}}
//!                         NotFound    → 404 {code, message}
//!                         Conflict    → 409
//!                         BusinessRule→ 422
//!                         Unauthenticated → 401, Forbidden → 403
//!                         Internal    → 500 (details logged, never sent)
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stockroom_core::{CoreError, FieldErrors};
use stockroom_db::DbError;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stock or lifecycle rule rejected the request.
    #[error("{0}")]
    BusinessRule(String),

    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BusinessRule(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::BusinessRule(_) => "business_rule",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => {
                (status, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Request failed");
                (
                    status,
                    Json(json!({
                        "code": "internal_error",
                        "message": "internal server error",
                    })),
                )
                    .into_response()
            }
            other => {
                let body = json!({
                    "code": other.code(),
                    "message": other.message(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BusinessRule(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg.clone(),
            ApiError::Validation(_) => self.to_string(),
        }
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::Validation(v) => ApiError::Validation(FieldErrors::from(v)),
            CoreError::InsufficientStock { .. }
            | CoreError::InvalidTransition { .. }
            | CoreError::LineItemsFrozen { .. }
            | CoreError::ReturnExceedsDelivered { .. }
            | CoreError::OrderNotDelivered(_) => ApiError::BusinessRule(err.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::Conflict(err.to_string())
            }
            DbError::Domain(core) => core.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (DbError::not_found("Order", "x").into(), StatusCode::NOT_FOUND),
            (DbError::duplicate("name").into(), StatusCode::CONFLICT),
            (
                DbError::ForeignKeyViolation {
                    message: "FOREIGN KEY constraint failed".to_string(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
            (
                DbError::Domain(CoreError::OrderNotDelivered("x".to_string())).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                DbError::Domain(CoreError::ProductNotFound("p".to_string())).into(),
                StatusCode::NOT_FOUND,
            ),
            (DbError::PoolExhausted.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err:?}");
        }
    }

    #[test]
    fn test_validation_keeps_field() {
        let err: ApiError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();

        match err {
            ApiError::Validation(errors) => assert!(errors.get("name").is_some()),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let response = ApiError::Internal("disk I/O error at /var/db".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
