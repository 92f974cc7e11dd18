//! Request body validation
//!
//! `ValidatedJson<T>` deserializes the body and runs the derived
//! `validator` rules before the handler ever sees the payload. All
//! violations are reported at once, joined into a single 400 response;
//! there is no partial success.

use crate::error::ApiError;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that rejects invalid payloads with a 400
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;

        value
            .validate()
            .map_err(|e| ApiError::Validation(join_messages(&e)))?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten every violated field into `"field: message"`, sorted by field
/// for a deterministic result, joined with `", "`.
fn join_messages(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .clone()
                    .unwrap_or_else(|| err.code.clone());
                format!("{}: {}", field, message)
            })
        })
        .collect();
    parts.sort();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SamplePayload {
        #[validate(length(min = 2, message = "Name is too short"))]
        name: String,
        #[validate(email(message = "Invalid email address"))]
        email: String,
    }

    #[test]
    fn test_valid_payload_passes() {
        let payload = SamplePayload {
            name: "Ann".to_string(),
            email: "a@x.com".to_string(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_all_violations_joined() {
        let payload = SamplePayload {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        let message = join_messages(&errors);

        assert_eq!(
            message,
            "email: Invalid email address, name: Name is too short"
        );
    }

    #[test]
    fn test_single_violation_has_no_separator() {
        let payload = SamplePayload {
            name: "Ann".to_string(),
            email: "nope".to_string(),
        };
        let errors = payload.validate().unwrap_err();
        assert_eq!(join_messages(&errors), "email: Invalid email address");
    }
}
