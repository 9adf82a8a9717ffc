use http::StatusCode;
use std::any::Any;

/// Returns the unqualified form of a type identifier.
///
/// `"my_app::errors::RateLimited"` becomes `"RateLimited"`; a name without
/// path separators is returned unchanged.
pub fn short_type_name(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

/// The seam between application error types and the resolver.
///
/// Implementors report a stable type identifier for rule matching, which
/// registered identifiers they satisfy (base types, interfaces), and optional
/// seed-phase hints read before any rule runs. `as_any` lets a registered
/// handler downcast back to the concrete type to read structured fields.
pub trait Resolvable: std::error::Error {
    /// Stable identifier for this error type, by convention the
    /// fully-qualified type path (e.g. `"my_app::errors::RateLimited"`).
    fn type_name(&self) -> &str;

    /// Unqualified identifier, derived from [`Resolvable::type_name`].
    fn short_name(&self) -> &str {
        short_type_name(self.type_name())
    }

    /// Whether this error satisfies the given registered identifier.
    ///
    /// The default matches the exact type name only. Override to also claim
    /// base-type or capability identifiers, so rules registered under a base
    /// name match derived error types.
    fn is_a(&self, error_type: &str) -> bool {
        error_type == self.type_name()
    }

    /// Status code the error itself suggests, applied during the seed phase.
    fn status_hint(&self) -> Option<StatusCode> {
        None
    }

    /// Message the error itself suggests, applied during the seed phase.
    ///
    /// Defaults to the `Display` rendering. Override to `None` for error
    /// types that should not seed a message.
    fn message_hint(&self) -> Option<String> {
        Some(self.to_string())
    }

    /// Downcast hook for registered handlers.
    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Plain;

    impl Resolvable for Plain {
        fn type_name(&self) -> &str {
            "tests::inner::Plain"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn short_type_name_strips_module_path() {
        assert_eq!(short_type_name("a::b::CError"), "CError");
        assert_eq!(short_type_name("CError"), "CError");
        assert_eq!(short_type_name(""), "");
    }

    #[test]
    fn defaults_match_exact_type_only() {
        let err = Plain;
        assert!(err.is_a("tests::inner::Plain"));
        assert!(!err.is_a("Plain"));
        assert!(!err.is_a("tests::inner::Other"));
        assert_eq!(err.short_name(), "Plain");
        assert_eq!(err.status_hint(), None);
        assert_eq!(err.message_hint().as_deref(), Some("boom"));
    }
}
