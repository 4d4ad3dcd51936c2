//! Halo occupation models for hodmock
//!
//! - ModelProvider / OccupationModel: the capability interface the
//!   population layer drives
//! - HaloTable: consolidated halo rows in model-native form
//! - HaloSource / HaloCatalog: per-rank halo input
//! - MassDefinition: `vir`, `NNNc`, `NNNm` halo boundary conventions
//! - Zheng07: reference occupation model

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod halo;
pub mod mdef;
pub mod provider;
pub mod sampling;
pub mod zheng07;

pub use error::{ModelError, ModelResult};
pub use halo::{HaloCatalog, HaloSource, HaloTable};
pub use mdef::MassDefinition;
pub use provider::{ModelAttrs, ModelProvider, OccupationModel, PopulateRequest};
pub use zheng07::{Zheng07, Zheng07Provider};
