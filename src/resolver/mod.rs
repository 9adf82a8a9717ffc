pub mod handlers;

use crate::resolvable::Resolvable;
use crate::resolver::handlers::HandlerRegistry;
use crate::rules::{Action, ErrorEntry, Mutator, Rule, RuleTable, positional_argument};
use http::StatusCode;

/// Per-resolution accumulator of status, message, and structured errors.
///
/// Seeded from the error instance (and an optional explicit status) before
/// any rule runs, then written to by matching rules and the registered
/// handler. Last writer wins for status and message; the error list is
/// append-only. One instance per resolution event, never shared.
#[derive(Debug)]
pub struct Resolution {
    status_code: Option<StatusCode>,
    message: Option<String>,
    errors: Vec<ErrorEntry>,
    matched: bool,
    error_type: String,
    short_name: String,
}

impl Resolution {
    /// Seed phase: explicit status first, then the error's own hints on top,
    /// so rules and handlers may later override both.
    fn seeded(error: &dyn Resolvable, explicit_status: Option<StatusCode>) -> Self {
        let mut resolution = Self {
            status_code: explicit_status,
            message: None,
            errors: Vec::new(),
            matched: false,
            error_type: error.type_name().to_string(),
            short_name: error.short_name().to_string(),
        };
        if let Some(status) = error.status_hint() {
            resolution.status_code = Some(status);
        }
        if let Some(message) = error.message_hint() {
            resolution.message = Some(message);
        }
        resolution
    }

    pub fn set_status_code(&mut self, status: StatusCode) -> &mut Self {
        self.status_code = Some(status);
        self
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    /// Appends entries to the structured error list, preserving order.
    /// The list is never reset mid-resolution.
    pub fn merge_errors(&mut self, entries: impl IntoIterator<Item = ErrorEntry>) -> &mut Self {
        self.errors.extend(entries);
        self
    }

    /// Appends a single structured error entry.
    pub fn error(&mut self, entry: ErrorEntry) -> &mut Self {
        self.errors.push(entry);
        self
    }

    pub fn status_code(&self) -> Option<StatusCode> {
        self.status_code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Type identifier of the error this resolution was built from.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    /// Unqualified form of [`Resolution::error_type`].
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Whether at least one rule applied or a registered handler ran.
    pub fn matched(&self) -> bool {
        self.matched
    }

    pub fn failed(&self) -> bool {
        !self.matched
    }
}

/// The resolution engine: a read-only rule table plus a handler registry,
/// both injected at construction and shared across resolutions.
pub struct ErrorResolver<'a> {
    rules: &'a RuleTable,
    handlers: &'a HandlerRegistry,
}

impl<'a> ErrorResolver<'a> {
    pub fn new(rules: &'a RuleTable, handlers: &'a HandlerRegistry) -> Self {
        Self { rules, handlers }
    }

    /// Resolves one error instance into a [`Resolution`].
    ///
    /// Seeds from `explicit_status` and the error's own hints, then applies
    /// every rule whose identifier the error satisfies, in table order (all
    /// matches apply; later entries override earlier writes), then invokes
    /// the handler registered under the error's exact type name, if any.
    ///
    /// A panicking callable or handler propagates to the caller; entries
    /// merged before the panic stay merged.
    pub fn resolve(
        &self,
        error: &dyn Resolvable,
        explicit_status: Option<StatusCode>,
    ) -> Resolution {
        let mut resolution = Resolution::seeded(error, explicit_status);

        for (error_type, rule) in self.rules.iter() {
            if !error.is_a(error_type) {
                continue;
            }
            tracing::debug!(error_type, "applying matched rule");
            match rule {
                Rule::Actions(actions) => {
                    for action in actions {
                        apply_action(action, error_type, &mut resolution);
                    }
                    resolution.matched = true;
                }
                Rule::ErrorArgs(values) => {
                    resolution.merge_errors(values.iter().cloned());
                    resolution.matched = true;
                }
                Rule::Scalar(value) => {
                    resolution.error(value.clone());
                    resolution.matched = true;
                }
                // The callable decides whether it handled the error.
                Rule::Callable(f) => {
                    if f(error, &mut resolution) {
                        resolution.matched = true;
                    }
                }
            }
        }

        if let Some(handler) = self.handlers.lookup(error.type_name()) {
            handler(error, &mut resolution);
            resolution.matched = true;
        }

        resolution
    }
}

/// Permissive action dispatch: unrecognized mutator names and ill-typed
/// arguments are skipped with a warning. [`RuleTable::validate`] is the
/// strict counterpart that rejects these at startup.
fn apply_action(action: &Action, error_type: &str, resolution: &mut Resolution) {
    let Ok(mutator) = action.mutator.parse::<Mutator>() else {
        tracing::warn!(
            mutator = %action.mutator,
            error_type,
            "skipping unrecognized mutator in rule"
        );
        return;
    };

    match mutator {
        Mutator::SetStatusCode => {
            let status = positional_argument(&action.argument)
                .as_u64()
                .and_then(|v| u16::try_from(v).ok())
                .and_then(|v| StatusCode::from_u16(v).ok());
            match status {
                Some(status) => {
                    resolution.set_status_code(status);
                }
                None => tracing::warn!(
                    argument = %action.argument,
                    error_type,
                    "skipping set_status_code with invalid status"
                ),
            }
        }
        Mutator::SetMessage => match positional_argument(&action.argument).as_str() {
            Some(message) => {
                resolution.set_message(message);
            }
            None => tracing::warn!(
                argument = %action.argument,
                error_type,
                "skipping set_message with non-string argument"
            ),
        },
        // An array argument spreads element-wise; anything else is one entry.
        Mutator::MergeErrors | Mutator::Error => match &action.argument {
            serde_json::Value::Array(values) => {
                resolution.merge_errors(values.iter().cloned());
            }
            value => {
                resolution.error(value.clone());
            }
        },
    }
}
