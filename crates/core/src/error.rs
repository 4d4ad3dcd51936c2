//! Error types for hodmock
//!
//! All failures raised by the population layer are represented by the
//! [`Error`] enum. Errors are:
//! - **Structured**: each variant has typed fields for error details
//! - **Serializable**: an error raised on the designated rank can be shipped
//!   to every other rank inside an abort frame and re-raised there unchanged
//!
//! # Categories
//!
//! | Category | Variants | Description |
//! |----------|----------|-------------|
//! | Collective | `Communication` | Collective could not complete; fatal |
//! | Configuration | `MissingParameter`, `UnknownParameter`, `Config` | Bad parameters, raised before any collective |
//! | Model | `Transform` | Failure inside the occupation model |
//! | Postcondition | `EmptyResult` | Population produced zero rows |
//! | Schema | `MissingColumn`, `SchemaMismatch` | Column layout does not match expectation |
//! | System | `InvalidInput`, `Io` | Everything else |

use serde::{Deserialize, Serialize};
use std::io;

/// Result type alias for hodmock operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the gather/transform/scatter layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Collective ====================
    /// A collective operation could not complete
    #[error("communication error: {reason}")]
    Communication {
        /// What went wrong on the transport
        reason: String,
    },

    // ==================== Configuration ====================
    /// A parameter required by the model is absent
    #[error("missing '{name}' parameter when initializing the occupation model")]
    MissingParameter {
        /// Name of the missing parameter
        name: String,
    },

    /// A supplied parameter is not recognized by the model
    #[error("'{name}' is not a valid model parameter name; valid are: {valid:?}")]
    UnknownParameter {
        /// Name that was rejected
        name: String,
        /// Names the model does recognize
        valid: Vec<String>,
    },

    /// Invalid configuration value
    #[error("configuration error: {reason}")]
    Config {
        /// Description of the problem
        reason: String,
    },

    // ==================== Model ====================
    /// The occupation model failed
    #[error("transform failed in model '{model}': {reason}")]
    Transform {
        /// Name of the model that failed
        model: String,
        /// Rendered model error
        reason: String,
    },

    // ==================== Postcondition ====================
    /// Population produced no rows across the whole group
    #[error("no particles in catalog after populating generation {generation}")]
    EmptyResult {
        /// Generation that would have been installed
        generation: u64,
    },

    // ==================== Schema ====================
    /// A column needed by an accessor is absent from the shard
    #[error("missing column '{name}'")]
    MissingColumn {
        /// Name of the missing column
        name: String,
    },

    /// Column sets or types do not line up
    #[error("schema mismatch: {reason}")]
    SchemaMismatch {
        /// Description of the mismatch
        reason: String,
    },

    // ==================== System ====================
    /// Invalid input
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// Description of the problem
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {reason}")]
    Io {
        /// Rendered I/O error
        reason: String,
    },
}

impl Error {
    /// Build a [`Error::Communication`]
    pub fn communication(reason: impl Into<String>) -> Self {
        Error::Communication {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::InvalidInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::SchemaMismatch`]
    pub fn schema_mismatch(reason: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::Config`]
    pub fn config(reason: impl Into<String>) -> Self {
        Error::Config {
            reason: reason.into(),
        }
    }

    /// Build a [`Error::MissingColumn`]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Error::MissingColumn { name: name.into() }
    }

    /// True if the group can no longer make progress after this error.
    ///
    /// Only collective failures are fatal: once ranks disagree about where
    /// they are in the collective sequence there is nothing to recover.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Communication { .. })
    }

    /// True for errors the caller can fix by supplying different parameters
    /// or configuration and retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingParameter { .. } | Error::UnknownParameter { .. } | Error::Config { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io {
            reason: e.to_string(),
        }
    }
}
