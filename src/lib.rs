#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod api_error;
pub mod error;
pub mod resolvable;
pub mod resolver;
pub mod rules;

pub use api_error::{API_ERROR_TYPE, ApiError};
pub use error::Error;
pub use resolvable::{Resolvable, short_type_name};
pub use resolver::handlers::{Handler, HandlerRegistry, unwrap_api_error};
pub use resolver::{ErrorResolver, Resolution};
pub use rules::{Action, ErrorEntry, Mutator, Rule, RuleFn, RuleTable, RuleTableBuilder};
