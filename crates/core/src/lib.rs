//! Core types for hodmock
//!
//! This crate defines the data model shared by every layer:
//! - RowSet: column-oriented table, the unit moved between ranks
//! - Column / ColumnData / DataType: typed column storage
//! - Value: dynamically typed cell for non-portable columns
//! - ModelParameters: name → value mapping bound onto an occupation model
//! - Generation: monotonic counter identifying an installed shard
//! - Error: error taxonomy for the gather/transform/scatter layer

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod column;
pub mod error;
pub mod generation;
pub mod params;
pub mod rowset;
pub mod value;

pub use column::{Column, ColumnData, DataType, TextColumn};
pub use error::{Error, Result};
pub use generation::Generation;
pub use params::ModelParameters;
pub use rowset::{Field, RowSet, Schema};
pub use value::Value;

/// Identifier of a participant in the collective group, `0..size`
pub type Rank = usize;
