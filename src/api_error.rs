use crate::resolvable::Resolvable;
use crate::rules::ErrorEntry;
use http::StatusCode;
use std::any::Any;

/// Identifier `ApiError` registers under, for rule tables and handler maps.
pub const API_ERROR_TYPE: &str = "api_error_resolver::ApiError";

/// A structured application error that carries its own response material.
///
/// This is the error shape produced by validation layers and domain guards:
/// a user-facing message, an optional status code, and an ordered list of
/// sub-errors. The built-in handler
/// [`unwrap_api_error`](crate::resolver::handlers::unwrap_api_error) copies
/// all three into the resolution.
#[derive(Debug, Clone, serde::Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// User-facing message.
    pub message: String,
    /// Status the error wants surfaced; `None` falls back to 500.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "status_as_u16"
    )]
    pub status: Option<StatusCode>,
    /// Ordered structured sub-errors (field errors, violation records).
    pub errors: Vec<ErrorEntry>,
}

fn status_as_u16<S: serde::Serializer>(
    status: &Option<StatusCode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match status {
        Some(code) => serializer.serialize_u16(code.as_u16()),
        None => serializer.serialize_none(),
    }
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            errors: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_errors(mut self, errors: impl IntoIterator<Item = ErrorEntry>) -> Self {
        self.errors.extend(errors);
        self
    }
}

impl Resolvable for ApiError {
    fn type_name(&self) -> &str {
        API_ERROR_TYPE
    }

    fn status_hint(&self) -> Option<StatusCode> {
        self.status
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_fields() {
        let err = ApiError::new("Validation failed")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_errors([serde_json::json!("field required")]);

        assert_eq!(err.message, "Validation failed");
        assert_eq!(err.status, Some(StatusCode::UNPROCESSABLE_ENTITY));
        assert_eq!(err.errors, vec![serde_json::json!("field required")]);
    }

    #[test]
    fn serializes_with_numeric_status() {
        let err = ApiError::new("Validation failed")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_errors([serde_json::json!("field required")]);

        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({
                "message": "Validation failed",
                "status": 422,
                "errors": ["field required"]
            })
        );

        let bare = ApiError::new("broke");
        assert_eq!(
            serde_json::to_value(&bare).unwrap(),
            serde_json::json!({ "message": "broke", "errors": [] })
        );
    }

    #[test]
    fn resolvable_identity_and_hints() {
        let err = ApiError::new("nope").with_status(StatusCode::FORBIDDEN);
        assert_eq!(err.type_name(), API_ERROR_TYPE);
        assert_eq!(err.short_name(), "ApiError");
        assert!(err.is_a(API_ERROR_TYPE));
        assert_eq!(err.status_hint(), Some(StatusCode::FORBIDDEN));
        assert_eq!(err.message_hint().as_deref(), Some("nope"));
    }
}
