use crate::api_error::{API_ERROR_TYPE, ApiError};
use crate::resolvable::Resolvable;
use crate::resolver::Resolution;
use http::StatusCode;
use std::collections::HashMap;

/// A type-specific handler: reads structured fields off the concrete error
/// (via [`Resolvable::as_any`]) and writes them through the resolution's
/// public mutators. Runs after the rule scan, whether or not rules matched.
pub type Handler = Box<dyn Fn(&dyn Resolvable, &mut Resolution) + Send + Sync>;

/// Explicit mapping from error-type identifier to its custom handler.
///
/// Populated at startup and shared read-only across resolutions. One handler
/// per identifier; registering under the same identifier again replaces the
/// previous handler.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the [`ApiError`] unwrapping handler.
    pub fn with_builtin() -> Self {
        Self::new().with(API_ERROR_TYPE, unwrap_api_error)
    }

    pub fn with(
        mut self,
        error_type: impl Into<String>,
        handler: impl Fn(&dyn Resolvable, &mut Resolution) + Send + Sync + 'static,
    ) -> Self {
        self.register(error_type, handler);
        self
    }

    pub fn register(
        &mut self,
        error_type: impl Into<String>,
        handler: impl Fn(&dyn Resolvable, &mut Resolution) + Send + Sync + 'static,
    ) {
        self.handlers.insert(error_type.into(), Box::new(handler));
    }

    pub fn lookup(&self, error_type: &str) -> Option<&Handler> {
        self.handlers.get(error_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Built-in handler for [`ApiError`]: merges its sub-errors (order
/// preserved), overwrites the message with the error's own, and overwrites
/// the status with the error's own or 500 when it carries none.
///
/// Template for user handlers: downcast, read structured fields, write
/// through the fluent mutators.
pub fn unwrap_api_error(error: &dyn Resolvable, resolution: &mut Resolution) {
    let Some(api_error) = error.as_any().downcast_ref::<ApiError>() else {
        return;
    };

    resolution
        .merge_errors(api_error.errors.iter().cloned())
        .set_message(api_error.message.clone())
        .set_status_code(
            api_error
                .status
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        );
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded(error: &dyn Resolvable) -> Resolution {
        Resolution::seeded(error, None)
    }

    #[test]
    fn builtin_registry_resolves_api_error_type() {
        let registry = HandlerRegistry::with_builtin();
        assert!(registry.lookup(API_ERROR_TYPE).is_some());
        assert!(registry.lookup("app::Unknown").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registering_same_identifier_replaces_handler() {
        let registry = HandlerRegistry::new()
            .with("app::X", |_, resolution| {
                resolution.set_message("first");
            })
            .with("app::X", |_, resolution| {
                resolution.set_message("second");
            });
        assert_eq!(registry.len(), 1);

        let error = ApiError::new("seed");
        let mut resolution = seeded(&error);
        (registry.lookup("app::X").unwrap())(&error, &mut resolution);
        assert_eq!(resolution.message(), Some("second"));
    }

    #[test]
    fn unwrap_copies_errors_message_and_status() {
        let error = ApiError::new("Validation failed")
            .with_status(StatusCode::UNPROCESSABLE_ENTITY)
            .with_errors([json!("field required")]);
        let mut resolution = seeded(&error);

        unwrap_api_error(&error, &mut resolution);
        assert_eq!(
            resolution.status_code(),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
        assert_eq!(resolution.message(), Some("Validation failed"));
        assert_eq!(resolution.errors(), &[json!("field required")]);
    }

    #[test]
    fn unwrap_falls_back_to_internal_server_error() {
        let error = ApiError::new("something broke");
        let mut resolution = seeded(&error);

        unwrap_api_error(&error, &mut resolution);
        assert_eq!(
            resolution.status_code(),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
        assert_eq!(resolution.message(), Some("something broke"));
        assert!(resolution.errors().is_empty());
    }

    #[test]
    fn unwrap_ignores_other_error_types() {
        #[derive(Debug, thiserror::Error)]
        #[error("other")]
        struct Other;

        impl Resolvable for Other {
            fn type_name(&self) -> &str {
                "tests::Other"
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }

        let error = Other;
        let mut resolution = seeded(&error);
        unwrap_api_error(&error, &mut resolution);
        // seed message only; nothing copied in
        assert_eq!(resolution.status_code(), None);
        assert_eq!(resolution.message(), Some("other"));
        assert!(resolution.errors().is_empty());
    }
}
