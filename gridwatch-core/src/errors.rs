//! Error taxonomy for the assessment pipeline

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Raw input outside its domain: a categorical value not in its
    /// enumeration, or a numeric field below its minimum.
    #[error("invalid value for `{field}`: {reason}")]
    Validation { field: &'static str, reason: String },

    /// Feature vector shape does not match the classifier input contract.
    #[error("feature vector has {actual} features, classifier expects {expected}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// A startup resource (classifier artifact, location table) is missing
    /// or corrupt. Fatal: there is no degraded mode.
    #[error("failed to load {}: {reason}", path.display())]
    ResourceLoad { path: PathBuf, reason: String },

    /// Analysis requested with no meters in the store. Non-fatal signal.
    #[error("no meters in store; nothing to analyze")]
    EmptyStore,
}
