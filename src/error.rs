//! Error types for the tabular-q crate

use thiserror::Error;

/// Main error type for the tabular-q crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown game '{name}' (expected one of: {expected})")]
    UnknownGame { name: String, expected: String },

    #[error("malformed state key '{key}': {reason}")]
    MalformedStateKey { key: String, reason: String },

    #[error("illegal action {action} in state '{state}'")]
    IllegalAction { action: i64, state: String },

    #[error("state '{state}' has no legal actions")]
    NoLegalActions { state: String },

    #[error("state '{state}' is not a reachable decision state")]
    UnreachableState { state: String },

    #[error("policy coverage violation at state '{state}': {detail}")]
    PolicyCoverage { state: String, detail: String },

    #[error("policy has no distribution for state '{state}'")]
    MissingPolicyEntry { state: String },

    #[error("player '{player}' cannot act here: {context}")]
    UnsupportedPlayer { player: String, context: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("input closed before a move was supplied")]
    InputClosed,

    #[error("malformed checkpoint record {record}: {message}")]
    MalformedCheckpoint { record: u64, message: String },

    #[error("value learner '{learner}' failed during episode {episode}: {message}")]
    LearnerFailed {
        learner: String,
        episode: usize,
        message: String,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    /// Whether this error signals a broken precondition rather than a
    /// runtime condition a caller could react to.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::PolicyCoverage { .. } | Error::UnreachableState { .. }
        )
    }
}
