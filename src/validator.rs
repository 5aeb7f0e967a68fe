//! JSON body extraction with `validator` rules applied.
//!
//! Bodies that fail to parse answer 400; bodies that parse but break a
//! `#[validate]` rule answer 422 with the rule messages joined together.

use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use hostelbyte_core::AppError;

/// Flattens validation errors into one line. Rules without a custom
/// message read `<field> is invalid`.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            messages.push(match &error.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            });
        }
    }
    messages.join(", ")
}

/// Turns a serde/axum rejection into a 400 that names the problem.
fn rejection_error(rejection: JsonRejection) -> AppError {
    let detail = rejection.body_text();

    let message = if let Some(rest) = detail.split("missing field `").nth(1) {
        let field = rest.split('`').next().unwrap_or("unknown");
        format!("{} is required", field)
    } else if detail.contains("invalid type") {
        "Invalid field type in request".to_string()
    } else if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        "Missing 'Content-Type: application/json' header".to_string()
    } else {
        "Invalid request body".to_string()
    };

    AppError::new(StatusCode::BAD_REQUEST, anyhow!(message))
}

/// `Json<T>` that also runs `T::validate()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!(validation_message(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(range(min = 1, message = "Capacity must be a positive number."))]
        capacity: i32,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(payload) =
            ValidatedJson::<Payload>::from_request(json_request(r#"{"capacity":2}"#), &())
                .await
                .unwrap();
        assert_eq!(payload.capacity, 2);
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let err = ValidatedJson::<Payload>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "capacity is required");
    }

    #[tokio::test]
    async fn test_rule_violation_is_unprocessable() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"capacity":0}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error.to_string(), "Capacity must be a positive number.");
    }

    #[tokio::test]
    async fn test_wrong_type_and_missing_content_type() {
        let err = ValidatedJson::<Payload>::from_request(json_request(r#"{"capacity":"two"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid field type in request");

        let request = Request::builder()
            .method("POST")
            .body(Body::from(r#"{"capacity":2}"#))
            .unwrap();
        let err = ValidatedJson::<Payload>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.error.to_string(),
            "Missing 'Content-Type: application/json' header"
        );
    }

    #[derive(Debug, Validate)]
    struct Unlabelled {
        #[validate(length(min = 1))]
        block: String,
    }

    #[test]
    fn test_validation_message_falls_back_to_field_name() {
        let errors = Unlabelled {
            block: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(validation_message(&errors), "block is invalid");
    }
}
