//! Error Types
//!
//! Usage errors surface as `ReactiveError` at the call site. Missing registry
//! entries are never errors, and effect failures are panics that unwind through
//! whichever write triggered them (see [`crate::config::FailurePolicy`]).

use thiserror::Error;

/// Errors returned by the reactive engine.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// A property key was empty or otherwise unusable.
    #[error("invalid property key {0:?}")]
    InvalidKey(String),

    /// The wrapped state has no property with this key.
    #[error("`{type_name}` has no property `{key}`")]
    UnknownKey {
        key: String,
        type_name: &'static str,
    },

    /// A value could not be converted to the property's type.
    #[error("property `{key}` rejected value: {source}")]
    ValueType {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A dynamic record was built from something that is not a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The engine configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;
