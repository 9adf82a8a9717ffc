#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config error: {reason}")]
    Config { reason: String },

    #[error("unknown mutator `{name}` in rule for `{error_type}`")]
    UnknownMutator { name: String, error_type: String },

    #[error("invalid argument for `{mutator}` in rule for `{error_type}`: {reason}")]
    InvalidArgument {
        mutator: String,
        error_type: String,
        reason: String,
    },
}
