use crate::error::Error;
use crate::resolvable::Resolvable;
use crate::resolver::Resolution;
use std::fmt;
use std::sync::Arc;

/// One structured entry in a resolution's error list.
pub type ErrorEntry = serde_json::Value;

/// A callable rule: mutates the resolution directly and reports whether it
/// handled the error (feeds the resolution's `matched` flag).
pub type RuleFn = Arc<dyn Fn(&dyn Resolvable, &mut Resolution) -> bool + Send + Sync>;

/// Recognized resolution mutators an action-map rule may name.
///
/// Config keys parse in both snake_case and camelCase. Anything that fails to
/// parse is skipped at dispatch time and rejected by [`RuleTable::validate`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
pub enum Mutator {
    #[strum(to_string = "set_status_code", serialize = "setStatusCode")]
    SetStatusCode,
    #[strum(to_string = "set_message", serialize = "setMessage")]
    SetMessage,
    #[strum(to_string = "merge_errors", serialize = "mergeErrors")]
    MergeErrors,
    #[strum(to_string = "error")]
    Error,
}

/// One entry of an action-map rule: a mutator name and its JSON argument.
///
/// The name is kept as written in config so permissive dispatch can warn on
/// (rather than reject) unrecognized names.
#[derive(Debug, Clone)]
pub struct Action {
    pub mutator: String,
    pub argument: serde_json::Value,
}

/// How a matched error type translates into resolution-state writes.
#[derive(Clone)]
pub enum Rule {
    /// Ordered mutator calls, applied in declared order.
    Actions(Vec<Action>),
    /// Positional values appended to the structured error list.
    ErrorArgs(Vec<ErrorEntry>),
    /// Arbitrary code run against the resolution.
    Callable(RuleFn),
    /// A single value appended to the structured error list.
    Scalar(ErrorEntry),
}

impl Rule {
    pub fn actions<S: Into<String>>(
        pairs: impl IntoIterator<Item = (S, serde_json::Value)>,
    ) -> Self {
        Self::Actions(
            pairs
                .into_iter()
                .map(|(mutator, argument)| Action {
                    mutator: mutator.into(),
                    argument,
                })
                .collect(),
        )
    }

    pub fn error_args(values: impl IntoIterator<Item = ErrorEntry>) -> Self {
        Self::ErrorArgs(values.into_iter().collect())
    }

    pub fn callable(
        f: impl Fn(&dyn Resolvable, &mut Resolution) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Callable(Arc::new(f))
    }

    pub fn scalar(value: ErrorEntry) -> Self {
        Self::Scalar(value)
    }

    /// Builds a data rule from its JSON config shape: an object becomes an
    /// action map (key order preserved), an array becomes positional error
    /// args, any other value a scalar. Callable rules have no config shape
    /// and are registered through [`RuleTableBuilder::rule`].
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Actions(
                map.iter()
                    .map(|(mutator, argument)| Action {
                        mutator: mutator.clone(),
                        argument: argument.clone(),
                    })
                    .collect(),
            ),
            serde_json::Value::Array(values) => Self::ErrorArgs(values.clone()),
            other => Self::Scalar(other.clone()),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actions(actions) => f.debug_tuple("Actions").field(actions).finish(),
            Self::ErrorArgs(values) => f.debug_tuple("ErrorArgs").field(values).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
        }
    }
}

/// Ordered mapping from error-type identifier to [`Rule`].
///
/// Insertion order is override precedence: during resolution every matching
/// entry applies, and later entries win any field both write. Built once at
/// startup and shared read-only across resolutions.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    entries: Vec<(String, Rule)>,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder {
            entries: Vec::new(),
        }
    }

    /// Builds a table from an already-parsed JSON config object mapping
    /// error-type identifiers to data-rule shapes. Declaration order is kept.
    pub fn from_json(config: &serde_json::Value) -> Result<Self, Error> {
        let map = config.as_object().ok_or_else(|| Error::Config {
            reason: format!("rule table must be a JSON object, got {config}"),
        })?;

        Ok(Self {
            entries: map
                .iter()
                .map(|(error_type, value)| (error_type.clone(), Rule::from_json(value)))
                .collect(),
        })
    }

    /// First rule registered under exactly this identifier.
    pub fn lookup(&self, error_type: &str) -> Option<&Rule> {
        self.entries
            .iter()
            .find(|(name, _)| name == error_type)
            .map(|(_, rule)| rule)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.entries.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Strict configuration validation.
    ///
    /// Rejects action-map entries whose mutator name is unrecognized or whose
    /// argument cannot fit the mutator's signature. Runtime dispatch stays
    /// permissive; call this at startup to fail fast instead.
    pub fn validate(&self) -> Result<(), Error> {
        for (error_type, rule) in self.iter() {
            let Rule::Actions(actions) = rule else {
                continue;
            };
            for action in actions {
                let mutator: Mutator =
                    action
                        .mutator
                        .parse()
                        .map_err(|_| Error::UnknownMutator {
                            name: action.mutator.clone(),
                            error_type: error_type.to_string(),
                        })?;
                validate_argument(mutator, &action.argument, error_type)?;
            }
        }
        Ok(())
    }
}

/// A sequence argument spreads as positional arguments; for the one-argument
/// setters that means a one-element array stands in for its element.
pub(crate) fn positional_argument(argument: &serde_json::Value) -> &serde_json::Value {
    match argument.as_array() {
        Some(values) if values.len() == 1 => &values[0],
        _ => argument,
    }
}

fn validate_argument(
    mutator: Mutator,
    argument: &serde_json::Value,
    error_type: &str,
) -> Result<(), Error> {
    match mutator {
        Mutator::SetStatusCode => {
            let code = positional_argument(argument)
                .as_u64()
                .and_then(|v| u16::try_from(v).ok());
            match code.map(http::StatusCode::from_u16) {
                Some(Ok(_)) => Ok(()),
                _ => Err(Error::InvalidArgument {
                    mutator: mutator.to_string(),
                    error_type: error_type.to_string(),
                    reason: format!("expected a valid HTTP status code, got {argument}"),
                }),
            }
        }
        Mutator::SetMessage => {
            if positional_argument(argument).is_string() {
                Ok(())
            } else {
                Err(Error::InvalidArgument {
                    mutator: mutator.to_string(),
                    error_type: error_type.to_string(),
                    reason: format!("expected a string, got {argument}"),
                })
            }
        }
        // Any JSON value is a legal structured-error entry; an array spreads.
        Mutator::MergeErrors | Mutator::Error => Ok(()),
    }
}

/// Builder preserving registration order, including callable rules that have
/// no JSON shape.
#[derive(Default)]
pub struct RuleTableBuilder {
    entries: Vec<(String, Rule)>,
}

impl RuleTableBuilder {
    pub fn rule(mut self, error_type: impl Into<String>, rule: Rule) -> Self {
        self.entries.push((error_type.into(), rule));
        self
    }

    pub fn build(self) -> RuleTable {
        RuleTable {
            entries: self.entries,
        }
    }
}
