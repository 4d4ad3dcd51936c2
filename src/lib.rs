//! hodmock - distributed halo occupation mock population
//!
//! A galaxy catalog is produced from a halo catalog spread across ranks:
//! every rank's halos are gathered onto one designated rank, an occupation
//! model turns them into galaxies there, and the galaxies are scattered
//! back so every rank holds a nearly equal contiguous share.
//!
//! # Quick Start
//!
//! ```ignore
//! use hodmock::{GalaxyCatalog, HaloCatalog, LocalCluster, ModelProvider, Zheng07Provider};
//! use std::sync::Arc;
//!
//! let comm = LocalCluster::new(1)?.remove(0);
//! let halos = Arc::new(HaloCatalog::cubic(halo_rows, 1000.0)?);
//! let mut catalog = GalaxyCatalog::builder()
//!     .params(Zheng07Provider.default_parameters())
//!     .seed(42)
//!     .populate(comm, halos, Arc::new(Zheng07Provider))?;
//!
//! let position = catalog.position()?;
//! catalog.repopulate(Some(43), &ModelParameters::new().with("alpha", 0.9))?;
//! ```
//!
//! # Layers
//!
//! - `hodmock-core`: row sets, columns, parameters, errors
//! - `hodmock-comm`: collectives, gather, scatter
//! - `hodmock-model`: occupation model interfaces and Zheng07
//! - `hodmock-engine`: catalogs, population cycles, configuration

pub use hodmock_comm::{
    balanced_counts, balanced_ranges, Communicator, Gatherer, LocalCluster, LocalComm,
    ScatterDistributor,
};
pub use hodmock_core::{
    Column, ColumnData, DataType, Error, Field, Generation, ModelParameters, Rank, Result, RowSet,
    Schema, TextColumn, Value,
};
pub use hodmock_engine::*;
pub use hodmock_model::{
    HaloCatalog, HaloSource, HaloTable, MassDefinition, ModelAttrs, ModelError, ModelProvider,
    OccupationModel, PopulateRequest, Zheng07, Zheng07Provider,
};
