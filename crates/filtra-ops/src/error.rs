//! Error types for filter construction.
//!
//! Applying a filter never fails. Errors only come from building a pipeline
//! out of a configuration document.

use thiserror::Error;

/// Error type for pipeline configuration.
#[derive(Error, Debug)]
pub enum OpsError {
    /// The YAML document could not be parsed.
    #[error("invalid pipeline config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A filter name that no filter answers to.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for pipeline configuration.
pub type OpsResult<T> = Result<T, OpsError>;
