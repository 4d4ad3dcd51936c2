//! Model-side errors
//!
//! These never cross a rank boundary directly: the population layer maps
//! them into the core error taxonomy before anything is scattered.

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Errors raised by occupation models and their inputs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A parameter name the model does not recognize
    #[error("'{name}' is not a valid parameter for model '{model}'")]
    UnknownParameter {
        /// Model that rejected the name
        model: String,
        /// Rejected name
        name: String,
        /// Names the model recognizes
        valid: Vec<String>,
    },

    /// A parameter the model needs was never bound
    #[error("parameter '{name}' is not bound on model '{model}'")]
    UnboundParameter {
        /// Model missing the value
        model: String,
        /// Missing name
        name: String,
    },

    /// A parameter value outside its valid range
    #[error("invalid value {value} for parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
        /// Why it is invalid
        reason: String,
    },

    /// The halo table lacks a property the model reads
    #[error("halo table has no '{column}' column")]
    MissingHaloProperty {
        /// Missing column name
        column: String,
    },

    /// A halo property has a non-numeric element type
    #[error("halo property '{column}' is not numeric")]
    NonNumericHaloProperty {
        /// Offending column name
        column: String,
    },

    /// The halo table still carries variant-typed columns
    #[error("halo table carries non-portable columns {columns:?}")]
    NonPortableHalos {
        /// Offending column names
        columns: Vec<String>,
    },

    /// Mass definition string could not be parsed
    #[error("invalid mass definition '{0}'; expected 'vir', 'NNNc' or 'NNNm'")]
    InvalidMassDefinition(String),

    /// Any other model failure
    #[error("population failed: {0}")]
    Population(String),
}
