//! Custom Axum extractors.
//!
//! [`Form`] stands in for `axum::Json` on every form body, so a body that
//! can't become a form fails the same way a form that doesn't validate
//! does: `422 {"errors": {field: [message]}}`.
//!
//! ```text
//! POST {"totalCents": "ten", "status": "shipped"}
//!        │
//!        ▼  Json<Value>            bad syntax, wrong content type → errors.body
//!        │
//!        ▼  serde_path_to_error    wrong type, unknown variant   → errors.totalCents
//!        │
//!   OrderForm ─► FormSchema::validate ─► OrderDraft
//! ```
//!
//! # Example
//!
//! ```ignore
//! async fn create(Form(form): Form<CustomerForm>) -> ApiResult<Json<Customer>> {
//!     let draft = form.validate()?;
//!     ...
//! }
//! ```

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;
use stockroom_core::FieldErrors;

use crate::error::ApiError;

/// Key for errors that belong to the body as a whole.
pub const BODY_FIELD: &str = "body";

/// A JSON form body whose decode errors are keyed by field path
/// (`totalCents`, `items[0].quantity`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Form<T>(pub T);

impl<S, T> FromRequest<S> for Form<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(body_rejection)?;

        decode(value).map(Form)
    }
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::Validation(FieldErrors::single(BODY_FIELD, rejection.body_text()))
}

/// Deserializes `value`, reporting the path of the first field that
/// doesn't fit. Errors at the root (an array instead of an object) go
/// under [`BODY_FIELD`].
fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let field = if path == "." { BODY_FIELD.to_string() } else { path };
        ApiError::Validation(FieldErrors::single(field, err.inner().to_string()))
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Status {
        Open,
        Delivered,
    }

    #[derive(Debug, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Line {
        quantity: i64,
    }

    impl Default for Line {
        fn default() -> Self {
            Line { quantity: 1 }
        }
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        status: Status,
        total_cents: i64,
        #[serde(default)]
        items: Vec<Line>,
    }

    fn errors(err: ApiError) -> FieldErrors {
        match err {
            ApiError::Validation(errors) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_decodes_well_formed_body() {
        let sample: Sample = decode(json!({
            "status": "delivered",
            "totalCents": 500,
            "items": [{ "quantity": 5 }],
        }))
        .unwrap();

        assert!(matches!(sample.status, Status::Delivered));
        assert_eq!(sample.total_cents, 500);
        assert_eq!(sample.items[0].quantity, 5);
    }

    #[test]
    fn test_wrong_type_is_keyed_by_field() {
        let err = decode::<Sample>(json!({ "status": "open", "totalCents": "ten" })).unwrap_err();
        let errors = errors(err);

        let messages = errors.get("totalCents").unwrap();
        assert!(messages[0].contains("invalid type"));
    }

    #[test]
    fn test_unknown_variant_is_keyed_by_field() {
        let err = decode::<Sample>(json!({ "status": "shipped", "totalCents": 1 })).unwrap_err();
        let errors = errors(err);

        assert!(errors.get("status").unwrap()[0].contains("unknown variant"));
    }

    #[test]
    fn test_nested_field_path() {
        let err = decode::<Sample>(json!({
            "status": "open",
            "totalCents": 1,
            "items": [{ "quantity": 2 }, { "quantity": "two" }],
        }))
        .unwrap_err();

        assert!(errors(err).get("items[1].quantity").is_some());
    }

    #[test]
    fn test_root_errors_go_under_body() {
        let err = decode::<Sample>(json!([1, 2, 3])).unwrap_err();
        assert!(errors(err).get(BODY_FIELD).is_some());
    }
}
